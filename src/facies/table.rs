// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Global facies table

use crate::error::{Result, TruncError};
use serde::{Deserialize, Serialize};

/// A named facies with its integer code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facies {
    pub name: String,
    pub code: i32,
}

impl Facies {
    pub fn new(name: impl Into<String>, code: i32) -> Self {
        Self {
            name: name.into(),
            code,
        }
    }
}

/// Ordered facies set, unique by name and by code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaciesTable {
    facies: Vec<Facies>,
}

impl FaciesTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, code)` pairs
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, i32)>) -> Result<Self> {
        let mut table = Self::new();
        for (name, code) in pairs {
            table.add(Facies::new(name, code))?;
        }
        Ok(table)
    }

    pub fn add(&mut self, facies: Facies) -> Result<()> {
        if self
            .facies
            .iter()
            .any(|f| f.name == facies.name || f.code == facies.code)
        {
            return Err(TruncError::DuplicateFacies {
                name: facies.name,
                code: facies.code,
            });
        }
        self.facies.push(facies);
        Ok(())
    }

    pub fn code_for_name(&self, name: &str) -> Option<i32> {
        self.facies.iter().find(|f| f.name == name).map(|f| f.code)
    }

    pub fn name_for_code(&self, code: i32) -> Option<&str> {
        self.facies
            .iter()
            .find(|f| f.code == code)
            .map(|f| f.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Facies> {
        self.facies.iter()
    }

    pub fn len(&self) -> usize {
        self.facies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facies.is_empty()
    }
}
