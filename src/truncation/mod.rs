// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Truncation rules: background partitions, truncation maps and facies
//! classification

mod classify;
mod cut;
mod non_cubic;
mod rule;
mod trunc_map;

pub use classify::FaciesClassifier;
pub use cut::{find_cut, Cut, CutFamily};
pub use non_cubic::{AnglePolygon, NonCubic};
pub use rule::TruncationRule;
pub use trunc_map::TruncMap;

use crate::config::TruncationSettings;
use crate::error::Result;
use crate::geometry::Polygon;
use crate::records::PolygonSpec;
use std::collections::HashMap;
use std::fmt::Debug;

/// Partition of the unit square among background facies
pub trait BackgroundModel: Debug + Clone {
    /// Model name used in persisted rule files
    fn name(&self) -> &'static str;

    /// Build and validate the model from its polygon records
    fn from_polygon_specs(
        rule: &str,
        specs: &[PolygonSpec],
        settings: &TruncationSettings,
    ) -> Result<Self>
    where
        Self: Sized;

    /// Background facies in order of first introduction
    fn background_facies(&self) -> &[String];

    fn n_polygons(&self) -> usize;

    /// Background facies index owning a polygon
    fn facies_index_for_polygon(&self, polygon: usize) -> usize;

    /// Share of its facies area a polygon receives
    fn prob_fraction_for_polygon(&self, polygon: usize) -> f64;

    fn facies_index_per_polygon(&self) -> Vec<usize> {
        (0..self.n_polygons())
            .map(|i| self.facies_index_for_polygon(i))
            .collect()
    }

    /// Names of per-cell parameters the model reads
    fn parameter_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Polygons giving each background facies its area, one per polygon
    /// record and in record order
    fn compute_polygons(
        &self,
        rule: &str,
        areas: &[f64],
        params: &HashMap<String, f64>,
        settings: &TruncationSettings,
    ) -> Result<Vec<Polygon>>;

    fn to_polygon_specs(&self) -> Vec<PolygonSpec>;
}
