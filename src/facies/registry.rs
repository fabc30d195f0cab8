// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Facies bookkeeping for one truncation rule

use super::FaciesTable;
use crate::error::{Result, TruncError};

/// Facies participating in a rule and their positions in zone arrays.
///
/// Facies in the rule are ordered background first, in order of first
/// introduction, then overlay facies. Probability vectors handed to the rule
/// are ordered like `facies_in_zone`.
#[derive(Debug, Clone, PartialEq)]
pub struct FaciesRegistry {
    facies_in_zone: Vec<String>,
    facies_in_rule: Vec<String>,
    n_background: usize,
    order_index: Vec<usize>,
    codes_in_zone: Vec<i32>,
}

impl FaciesRegistry {
    pub fn new(
        rule: &str,
        table: &FaciesTable,
        facies_in_zone: &[String],
        background: &[String],
        overlay: &[String],
    ) -> Result<Self> {
        for (i, name) in facies_in_zone.iter().enumerate() {
            if facies_in_zone[..i].contains(name) {
                return Err(TruncError::InvalidStructure {
                    rule: rule.to_string(),
                    reason: format!("facies '{}' is listed twice for the zone", name),
                });
            }
        }

        let mut facies_in_rule: Vec<String> = Vec::with_capacity(facies_in_zone.len());
        for name in background {
            if !facies_in_rule.contains(name) {
                facies_in_rule.push(name.clone());
            }
        }
        let n_background = facies_in_rule.len();
        for name in overlay {
            if facies_in_rule[..n_background].contains(name) {
                return Err(TruncError::OverlayConflict {
                    rule: rule.to_string(),
                    reason: format!(
                        "overlay facies '{}' is also used as a background facies",
                        name
                    ),
                });
            }
            if !facies_in_rule.contains(name) {
                facies_in_rule.push(name.clone());
            }
        }

        let mut order_index = Vec::with_capacity(facies_in_rule.len());
        for name in &facies_in_rule {
            let zone_index = facies_in_zone
                .iter()
                .position(|f| f == name)
                .ok_or_else(|| TruncError::UnknownFacies {
                    rule: rule.to_string(),
                    facies: name.clone(),
                    zone: facies_in_zone.to_vec(),
                })?;
            order_index.push(zone_index);
        }
        if facies_in_rule.len() != facies_in_zone.len() {
            return Err(TruncError::FaciesMismatch {
                rule: rule.to_string(),
                in_rule: facies_in_rule,
                in_zone: facies_in_zone.to_vec(),
            });
        }

        let codes_in_zone = facies_in_zone
            .iter()
            .map(|name| {
                table
                    .code_for_name(name)
                    .ok_or_else(|| TruncError::NotInTable {
                        facies: name.clone(),
                    })
            })
            .collect::<Result<Vec<i32>>>()?;

        let registry = Self {
            facies_in_zone: facies_in_zone.to_vec(),
            facies_in_rule,
            n_background,
            order_index,
            codes_in_zone,
        };
        registry.check_invariants()?;
        Ok(registry)
    }

    /// `order_index` must be a permutation of the zone positions
    pub fn check_invariants(&self) -> Result<()> {
        let n = self.facies_in_zone.len();
        if self.order_index.len() != n || self.facies_in_rule.len() != n {
            return Err(TruncError::IndexInvariant(format!(
                "{} facies in rule, {} order indices, {} facies in zone",
                self.facies_in_rule.len(),
                self.order_index.len(),
                n
            )));
        }
        let mut seen = vec![false; n];
        for (rule_index, &zone_index) in self.order_index.iter().enumerate() {
            if zone_index >= n || seen[zone_index] {
                return Err(TruncError::IndexInvariant(format!(
                    "order index {} for facies '{}' is out of range or repeated",
                    zone_index, self.facies_in_rule[rule_index]
                )));
            }
            if self.facies_in_zone[zone_index] != self.facies_in_rule[rule_index] {
                return Err(TruncError::IndexInvariant(format!(
                    "order index {} maps '{}' to '{}'",
                    zone_index, self.facies_in_rule[rule_index], self.facies_in_zone[zone_index]
                )));
            }
            seen[zone_index] = true;
        }
        Ok(())
    }

    pub fn facies_in_zone(&self) -> &[String] {
        &self.facies_in_zone
    }

    pub fn facies_in_rule(&self) -> &[String] {
        &self.facies_in_rule
    }

    /// Maps a position in `facies_in_rule` to a position in `facies_in_zone`
    pub fn order_index(&self) -> &[usize] {
        &self.order_index
    }

    pub fn n_facies(&self) -> usize {
        self.facies_in_zone.len()
    }

    pub fn n_background(&self) -> usize {
        self.n_background
    }

    pub fn n_overlay(&self) -> usize {
        self.facies_in_rule.len() - self.n_background
    }

    pub fn is_background(&self, rule_index: usize) -> bool {
        rule_index < self.n_background
    }

    pub fn rule_index_of(&self, name: &str) -> Option<usize> {
        self.facies_in_rule.iter().position(|f| f == name)
    }

    pub fn zone_index_of(&self, name: &str) -> Option<usize> {
        self.facies_in_zone.iter().position(|f| f == name)
    }

    pub fn zone_index_for_rule_index(&self, rule_index: usize) -> usize {
        self.order_index[rule_index]
    }

    pub fn code_for_zone_index(&self, zone_index: usize) -> i32 {
        self.codes_in_zone[zone_index]
    }

    /// Reorder a zone-ordered vector into rule order
    pub fn to_rule_order(&self, values_in_zone: &[f64]) -> Vec<f64> {
        self.order_index.iter().map(|&z| values_in_zone[z]).collect()
    }
}
