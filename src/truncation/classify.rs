// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Facies lookup for points of the alpha space

use super::{BackgroundModel, TruncMap, TruncationRule};
use crate::error::{Result, TruncError};
use crate::geometry::ray_crosses_edge;
use crate::utils::math::shift_in_unit_interval;
use tracing::debug;

/// Classifies alpha points against one truncation map.
///
/// Background polygons are tested in order and the first one containing the
/// point wins. A point claimed by no polygon is nudged once by the shift
/// tolerance and tested again. Overlay intervals are then checked for the
/// background facies found.
#[derive(Debug, Clone, Copy)]
pub struct FaciesClassifier<'a, M: BackgroundModel> {
    rule: &'a TruncationRule<M>,
    map: &'a TruncMap,
}

impl<'a, M: BackgroundModel> FaciesClassifier<'a, M> {
    pub fn new(rule: &'a TruncationRule<M>, map: &'a TruncMap) -> Result<Self> {
        let n_polygons = rule.background_model().n_polygons();
        if map.polygons.len() != n_polygons
            || map.facies_index_per_polygon.len() != n_polygons
            || map.intervals.len() != rule.overlay_model().n_groups()
            || map.probabilities.len() != rule.registry().n_facies()
        {
            return Err(TruncError::IndexInvariant(format!(
                "truncation map does not belong to rule '{}'",
                rule.name()
            )));
        }
        Ok(Self { rule, map })
    }

    /// First polygon containing `(x, y)`
    pub fn polygon_for_point(&self, x: f64, y: f64) -> Option<usize> {
        self.map.polygons.iter().position(|p| p.contains(x, y))
    }

    fn code_and_index(&self, rule_index: usize) -> (i32, usize) {
        let registry = self.rule.registry();
        let zone_index = registry.zone_index_for_rule_index(rule_index);
        (registry.code_for_zone_index(zone_index), zone_index)
    }

    fn determined(&self) -> Option<(i32, usize)> {
        let registry = self.rule.registry();
        self.map
            .determined
            .map(|zone_index| (registry.code_for_zone_index(zone_index), zone_index))
    }

    /// Facies code and zone index of one point
    pub fn classify(&self, alpha: &[f64]) -> Result<(i32, usize)> {
        if let Some(result) = self.determined() {
            return Ok(result);
        }

        let n_alpha = self.rule.n_alpha_used();
        if alpha.len() < n_alpha {
            return Err(TruncError::AlphaLength {
                rule: self.rule.name().to_string(),
                expected: n_alpha,
                got: alpha.len(),
            });
        }

        let (x, y) = (alpha[0], alpha[1]);
        let polygon = match self.polygon_for_point(x, y) {
            Some(polygon) => polygon,
            None => {
                let shift = self.rule.settings().shift_tolerance;
                let (xs, ys) = (shift_in_unit_interval(x, shift), shift_in_unit_interval(y, shift));
                debug!(rule = %self.rule.name(), x, y, "point outside all polygons, retrying shifted");
                self.polygon_for_point(xs, ys)
                    .ok_or_else(|| TruncError::Unclassified {
                        rule: self.rule.name().to_string(),
                        x,
                        y,
                    })?
            }
        };

        let background = self.map.facies_index_per_polygon[polygon];
        let facies = self
            .rule
            .overlay_model()
            .overlay_facies_for(background, alpha, &self.map.intervals)
            .unwrap_or(background);
        Ok(self.code_and_index(facies))
    }

    /// Facies codes and zone indices for points given column-wise, one
    /// slice per alpha coordinate
    pub fn classify_batch(&self, columns: &[&[f64]]) -> Result<(Vec<i32>, Vec<usize>)> {
        let n = columns.first().map_or(0, |c| c.len());
        if let Some((code, zone_index)) = self.determined() {
            return Ok((vec![code; n], vec![zone_index; n]));
        }

        let n_alpha = self.rule.n_alpha_used();
        if columns.len() < n_alpha {
            return Err(TruncError::AlphaLength {
                rule: self.rule.name().to_string(),
                expected: n_alpha,
                got: columns.len(),
            });
        }
        if let Some(column) = columns[..n_alpha].iter().find(|c| c.len() != n) {
            return Err(TruncError::AlphaLength {
                rule: self.rule.name().to_string(),
                expected: n,
                got: column.len(),
            });
        }

        let (xs, ys) = (columns[0], columns[1]);
        let mut owner: Vec<Option<usize>> = vec![None; n];
        let all: Vec<usize> = (0..n).collect();
        self.claim_points(xs, ys, &all, &mut owner);

        let unclaimed: Vec<usize> = (0..n).filter(|&j| owner[j].is_none()).collect();
        if !unclaimed.is_empty() {
            let shift = self.rule.settings().shift_tolerance;
            let shifted_x: Vec<f64> = unclaimed
                .iter()
                .map(|&j| shift_in_unit_interval(xs[j], shift))
                .collect();
            let shifted_y: Vec<f64> = unclaimed
                .iter()
                .map(|&j| shift_in_unit_interval(ys[j], shift))
                .collect();
            let local: Vec<usize> = (0..unclaimed.len()).collect();
            let mut retry_owner: Vec<Option<usize>> = vec![None; unclaimed.len()];
            self.claim_points(&shifted_x, &shifted_y, &local, &mut retry_owner);

            debug!(
                rule = %self.rule.name(),
                retried = unclaimed.len(),
                "points outside all polygons, retrying shifted"
            );
            for (k, &j) in unclaimed.iter().enumerate() {
                match retry_owner[k] {
                    Some(polygon) => owner[j] = Some(polygon),
                    None => {
                        return Err(TruncError::Unclassified {
                            rule: self.rule.name().to_string(),
                            x: xs[j],
                            y: ys[j],
                        })
                    }
                }
            }
        }

        let background: Vec<usize> = owner
            .iter()
            .map(|o| o.map_or(0, |p| self.map.facies_index_per_polygon[p]))
            .collect();
        let mut facies = background.clone();

        let overlay = self.rule.overlay_model();
        for (g, group) in overlay.groups().iter().enumerate() {
            let mut pending: Vec<bool> = background
                .iter()
                .map(|&b| overlay.group_for_background(b) == Some(g))
                .collect();
            for (entry, interval) in group.entries.iter().zip(&self.map.intervals[g]) {
                let values = columns[entry.alpha];
                for j in 0..n {
                    if pending[j] && interval.contains(values[j]) {
                        facies[j] = entry.overlay_facies;
                        pending[j] = false;
                    }
                }
            }
        }

        Ok(facies.into_iter().map(|f| self.code_and_index(f)).unzip())
    }

    /// Assign each listed point to the first polygon containing it.
    ///
    /// Polygons are visited in order and each one is tested only against
    /// points no earlier polygon claimed. Crossings are accumulated edge by
    /// edge over all pending points.
    fn claim_points(&self, xs: &[f64], ys: &[f64], points: &[usize], owner: &mut [Option<usize>]) {
        let mut pending: Vec<usize> = points.to_vec();
        let mut crossings: Vec<u32> = Vec::with_capacity(pending.len());

        for (index, polygon) in self.map.polygons.iter().enumerate() {
            if pending.is_empty() {
                break;
            }
            if polygon.is_empty() {
                continue;
            }

            crossings.clear();
            crossings.resize(pending.len(), 0);
            for (a, b) in polygon.edges() {
                for (count, &j) in crossings.iter_mut().zip(&pending) {
                    if ray_crosses_edge(xs[j], ys[j], a, b) {
                        *count += 1;
                    }
                }
            }

            let mut still_pending = Vec::with_capacity(pending.len());
            for (&count, &j) in crossings.iter().zip(&pending) {
                if count % 2 == 1 {
                    owner[j] = Some(index);
                } else {
                    still_pending.push(j);
                }
            }
            pending = still_pending;
        }
    }
}
