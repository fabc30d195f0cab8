// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use crate::geometry::Polygon;
use crate::overlay::Interval;
use serde::{Deserialize, Serialize};

/// Truncation map for one probability vector.
///
/// Produced by [`super::TruncationRule::set_trunc_rule`] and read by
/// [`super::FaciesClassifier`]. Facies indices in `facies_index_per_polygon`
/// are rule indices of background facies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruncMap {
    pub(crate) probabilities: Vec<f64>,
    pub(crate) determined: Option<usize>,
    pub(crate) background_areas: Vec<f64>,
    pub(crate) polygons: Vec<Polygon>,
    pub(crate) facies_index_per_polygon: Vec<usize>,
    pub(crate) intervals: Vec<Vec<Interval>>,
}

impl TruncMap {
    /// Normalized facies probabilities, in zone order
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Zone index of the facies with probability one, if any
    pub fn determined_facies(&self) -> Option<usize> {
        self.determined
    }

    pub fn is_determined(&self) -> bool {
        self.determined.is_some()
    }

    /// Areas assigned to background facies after the overlay adjustment,
    /// in rule order
    pub fn background_areas(&self) -> &[f64] {
        &self.background_areas
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn facies_index_per_polygon(&self) -> &[usize] {
        &self.facies_index_per_polygon
    }

    pub fn polygon_areas(&self) -> Vec<f64> {
        self.polygons.iter().map(Polygon::area).collect()
    }

    /// Per overlay group, the interval of each entry
    pub fn overlay_intervals(&self) -> &[Vec<Interval>] {
        &self.intervals
    }
}
