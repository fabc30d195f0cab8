// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Plain records describing a truncation rule
//!
//! These are what a model-file reader hands to [`crate::TruncationRule::initialize`]
//! and what [`crate::TruncationRule::to_spec`] gives back for persistence.

use crate::config::TruncationSettings;
use crate::error::Result;
use crate::facies::{Facies, FaciesTable};
use crate::truncation::TruncationRule;
use serde::{Deserialize, Serialize};
use std::fmt;

fn one() -> f64 {
    1.0
}

fn half() -> f64 {
    0.5
}

/// Orientation of a polygon boundary, in degrees anticlockwise from the first axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AngleSpec {
    /// Same angle in every cell
    Constant(f64),
    /// Angle read per cell from the named parameter
    Parameter(String),
}

impl AngleSpec {
    pub fn as_constant(&self) -> Option<f64> {
        match self {
            AngleSpec::Constant(value) => Some(*value),
            AngleSpec::Parameter(_) => None,
        }
    }
}

impl fmt::Display for AngleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AngleSpec::Constant(value) => write!(f, "{}", value),
            AngleSpec::Parameter(name) => write!(f, "{}", name),
        }
    }
}

/// One polygon entry of the angle-based background model, in carving order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonSpec {
    pub facies: String,
    pub angle: AngleSpec,
    #[serde(default = "one")]
    pub prob_fraction: f64,
    /// Angle may be changed by parameter-update workflows
    #[serde(default)]
    pub updatable: bool,
}

impl PolygonSpec {
    pub fn new(facies: impl Into<String>, angle: f64, prob_fraction: f64) -> Self {
        Self {
            facies: facies.into(),
            angle: AngleSpec::Constant(angle),
            prob_fraction,
            updatable: false,
        }
    }
}

/// One overlay facies truncated on an extra alpha field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayEntrySpec {
    pub alpha_field: String,
    pub overlay_facies: String,
    #[serde(default = "one")]
    pub prob_fraction: f64,
    /// Center of the truncation interval on the alpha field
    #[serde(default = "half")]
    pub center: f64,
}

impl OverlayEntrySpec {
    pub fn new(
        alpha_field: impl Into<String>,
        overlay_facies: impl Into<String>,
        prob_fraction: f64,
        center: f64,
    ) -> Self {
        Self {
            alpha_field: alpha_field.into(),
            overlay_facies: overlay_facies.into(),
            prob_fraction,
            center,
        }
    }
}

/// Background facies sharing the same overlay facies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub alpha_entries: Vec<OverlayEntrySpec>,
    pub background_facies: Vec<String>,
}

/// Complete rule configuration for one zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruncRuleSpec {
    pub name: String,
    pub facies_in_zone: Vec<String>,
    pub gauss_fields_in_zone: Vec<String>,
    /// The two fields spanning the background truncation map
    pub background_alpha_fields: Vec<String>,
    pub polygons: Vec<PolygonSpec>,
    #[serde(default)]
    pub overlay_groups: Vec<GroupSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaciesRecord {
    pub name: String,
    pub code: i32,
}

/// Self-contained rule file: facies table, rule and optional engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleFile {
    pub facies_table: Vec<FaciesRecord>,
    pub rule: TruncRuleSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<TruncationSettings>,
}

impl RuleFile {
    pub fn facies_table(&self) -> Result<FaciesTable> {
        let mut table = FaciesTable::new();
        for record in &self.facies_table {
            table.add(Facies::new(record.name.clone(), record.code))?;
        }
        Ok(table)
    }

    pub fn settings(&self) -> TruncationSettings {
        self.settings.clone().unwrap_or_default()
    }

    /// Build the rule this file describes
    pub fn build(&self) -> Result<TruncationRule> {
        TruncationRule::initialize(&self.facies_table()?, &self.rule, self.settings())
    }

    pub fn with_table(table: &FaciesTable, rule: TruncRuleSpec) -> Self {
        Self {
            facies_table: table
                .iter()
                .map(|f| FaciesRecord {
                    name: f.name.clone(),
                    code: f.code,
                })
                .collect(),
            rule,
            settings: None,
        }
    }
}
