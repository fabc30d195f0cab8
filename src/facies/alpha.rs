// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mapping from alpha coordinates to gaussian fields

use crate::error::{Result, TruncError};

/// Alpha coordinate number to gaussian field index.
///
/// Alpha 0 and 1 are the two background fields. Each overlay field gets the
/// next alpha number the first time a group uses it.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaFieldMap {
    fields_in_zone: Vec<String>,
    alpha_index_list: Vec<usize>,
}

impl AlphaFieldMap {
    pub fn new(rule: &str, fields_in_zone: &[String], background_fields: &[String]) -> Result<Self> {
        if background_fields.len() != 2 {
            return Err(TruncError::InvalidStructure {
                rule: rule.to_string(),
                reason: format!(
                    "expected two background alpha fields, got {}",
                    background_fields.len()
                ),
            });
        }
        if background_fields[0] == background_fields[1] {
            return Err(TruncError::InvalidStructure {
                rule: rule.to_string(),
                reason: format!(
                    "background alpha fields must differ, both are '{}'",
                    background_fields[0]
                ),
            });
        }

        let mut alpha_index_list = Vec::with_capacity(fields_in_zone.len());
        for field in background_fields {
            alpha_index_list.push(Self::field_index(rule, fields_in_zone, field)?);
        }
        Ok(Self {
            fields_in_zone: fields_in_zone.to_vec(),
            alpha_index_list,
        })
    }

    fn field_index(rule: &str, fields_in_zone: &[String], field: &str) -> Result<usize> {
        fields_in_zone
            .iter()
            .position(|f| f == field)
            .ok_or_else(|| TruncError::UnknownField {
                rule: rule.to_string(),
                field: field.to_string(),
                zone: fields_in_zone.to_vec(),
            })
    }

    /// Alpha number for an overlay field, allocating one on first use
    pub fn alpha_for_overlay_field(&mut self, rule: &str, field: &str) -> Result<usize> {
        let index = Self::field_index(rule, &self.fields_in_zone, field)?;
        if self.alpha_index_list[..2].contains(&index) {
            return Err(TruncError::OverlayConflict {
                rule: rule.to_string(),
                reason: format!(
                    "overlay alpha field '{}' is one of the background alpha fields",
                    field
                ),
            });
        }
        if let Some(alpha) = self.alpha_index_list.iter().position(|&i| i == index) {
            return Ok(alpha);
        }
        self.alpha_index_list.push(index);
        Ok(self.alpha_index_list.len() - 1)
    }

    /// Gaussian field index for each alpha number
    pub fn alpha_index_list(&self) -> &[usize] {
        &self.alpha_index_list
    }

    pub fn n_alpha(&self) -> usize {
        self.alpha_index_list.len()
    }

    pub fn fields_in_zone(&self) -> &[String] {
        &self.fields_in_zone
    }

    pub fn field_name(&self, alpha: usize) -> Option<&str> {
        self.alpha_index_list
            .get(alpha)
            .map(|&i| self.fields_in_zone[i].as_str())
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.alpha_index_list
            .iter()
            .map(|&i| self.fields_in_zone[i].as_str())
            .collect()
    }
}
