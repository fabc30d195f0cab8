// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! APS Truncation Rules
//!
//! Truncation rules for adaptive plurigaussian simulation. A rule partitions
//! the unit square of two transformed gaussian fields into facies polygons
//! whose areas match the facies probabilities of a grid cell, optionally
//! painting overlay facies on top through intervals on extra fields.

pub mod cli;
pub mod config;
pub mod error;
pub mod facies;
pub mod geometry;
pub mod io;
pub mod overlay;
pub mod records;
pub mod truncation;
pub mod utils;

pub use config::TruncationSettings;
pub use error::{Result, TruncError};
pub use facies::{Facies, FaciesTable};
pub use geometry::Polygon;
pub use records::{
    AngleSpec, FaciesRecord, GroupSpec, OverlayEntrySpec, PolygonSpec, RuleFile, TruncRuleSpec,
};
pub use truncation::{BackgroundModel, FaciesClassifier, NonCubic, TruncMap, TruncationRule};
