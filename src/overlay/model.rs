// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Overlay groups and the probability adjustment they require

use crate::error::{Result, TruncError};
use crate::facies::{AlphaFieldMap, FaciesRegistry};
use crate::records::{GroupSpec, OverlayEntrySpec};
use crate::utils::math::approx_eq;
use serde::{Deserialize, Serialize};

/// Truncation interval on an overlay alpha field, open below and closed above
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

impl Interval {
    pub const EMPTY: Interval = Interval { low: 0.0, high: 0.0 };

    /// Interval of `width` centered at `center`, shifted to fit in `[0, 1]`
    pub fn centered(center: f64, width: f64) -> Self {
        let low = center - 0.5 * width;
        let high = center + 0.5 * width;
        if low < 0.0 {
            Self { low: 0.0, high: width }
        } else if high > 1.0 {
            Self {
                low: 1.0 - width,
                high: 1.0,
            }
        } else {
            Self { low, high }
        }
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value > self.low && value <= self.high
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

/// One overlay facies on one alpha field
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayEntry {
    /// Alpha number of the field the interval applies to
    pub alpha: usize,
    /// Rule index of the overlay facies
    pub overlay_facies: usize,
    pub prob_fraction: f64,
    pub center: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayGroup {
    /// Entries in the order their intervals are tested
    pub entries: Vec<OverlayEntry>,
    /// Rule indices of the background facies the group paints over
    pub background_facies: Vec<usize>,
}

/// Background areas and overlay intervals for one probability vector
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayAdjustment {
    /// Area each background facies must receive in the unit square
    pub background_areas: Vec<f64>,
    /// Per group, one interval per entry
    pub intervals: Vec<Vec<Interval>>,
}

/// Overlay facies painted over background facies through interval tests on
/// extra alpha fields
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayModel {
    groups: Vec<OverlayGroup>,
    group_for_background: Vec<Option<usize>>,
}

impl OverlayModel {
    /// Model without overlay facies
    pub fn none(n_background: usize) -> Self {
        Self {
            groups: Vec::new(),
            group_for_background: vec![None; n_background],
        }
    }

    /// Overlay facies names in order of first appearance
    pub fn overlay_facies_names(groups: &[GroupSpec]) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for entry in groups.iter().flat_map(|g| g.alpha_entries.iter()) {
            if !names.contains(&entry.overlay_facies) {
                names.push(entry.overlay_facies.clone());
            }
        }
        names
    }

    /// Resolve and validate group records against the facies registry.
    ///
    /// Overlay fields get their alpha numbers allocated here, in order of
    /// first use.
    pub fn build(
        rule: &str,
        specs: &[GroupSpec],
        registry: &FaciesRegistry,
        alpha_fields: &mut AlphaFieldMap,
        eps: f64,
    ) -> Result<Self> {
        let conflict = |reason: String| TruncError::OverlayConflict {
            rule: rule.to_string(),
            reason,
        };

        let mut model = Self::none(registry.n_background());
        let mut fraction_sums = vec![0.0; registry.n_facies()];

        for (g, spec) in specs.iter().enumerate() {
            if spec.alpha_entries.is_empty() || spec.background_facies.is_empty() {
                return Err(TruncError::InvalidStructure {
                    rule: rule.to_string(),
                    reason: format!(
                        "overlay group {} needs at least one alpha field and one background facies",
                        g
                    ),
                });
            }

            let mut background_facies = Vec::with_capacity(spec.background_facies.len());
            for name in &spec.background_facies {
                let index = registry
                    .rule_index_of(name)
                    .ok_or_else(|| TruncError::UnknownFacies {
                        rule: rule.to_string(),
                        facies: name.clone(),
                        zone: registry.facies_in_zone().to_vec(),
                    })?;
                if !registry.is_background(index) {
                    return Err(conflict(format!(
                        "'{}' in overlay group {} is not a background facies",
                        name, g
                    )));
                }
                if let Some(other) = model.group_for_background[index] {
                    return Err(conflict(format!(
                        "background facies '{}' belongs to overlay groups {} and {}",
                        name, other, g
                    )));
                }
                model.group_for_background[index] = Some(g);
                background_facies.push(index);
            }

            let mut entries: Vec<OverlayEntry> = Vec::with_capacity(spec.alpha_entries.len());
            for entry in &spec.alpha_entries {
                let alpha = alpha_fields.alpha_for_overlay_field(rule, &entry.alpha_field)?;
                if entries.iter().any(|e| e.alpha == alpha) {
                    return Err(conflict(format!(
                        "alpha field '{}' is used twice in overlay group {}",
                        entry.alpha_field, g
                    )));
                }
                let overlay_facies = registry
                    .rule_index_of(&entry.overlay_facies)
                    .ok_or_else(|| TruncError::UnknownFacies {
                        rule: rule.to_string(),
                        facies: entry.overlay_facies.clone(),
                        zone: registry.facies_in_zone().to_vec(),
                    })?;
                if !(entry.prob_fraction > 0.0 && entry.prob_fraction <= 1.0) {
                    return Err(TruncError::InvalidFraction {
                        rule: rule.to_string(),
                        facies: entry.overlay_facies.clone(),
                        value: entry.prob_fraction,
                    });
                }
                if !(0.0..=1.0).contains(&entry.center) {
                    return Err(TruncError::InvalidCenter {
                        rule: rule.to_string(),
                        facies: entry.overlay_facies.clone(),
                        value: entry.center,
                    });
                }
                fraction_sums[overlay_facies] += entry.prob_fraction;
                entries.push(OverlayEntry {
                    alpha,
                    overlay_facies,
                    prob_fraction: entry.prob_fraction,
                    center: entry.center,
                });
            }

            model.groups.push(OverlayGroup {
                entries,
                background_facies,
            });
        }

        for index in registry.n_background()..registry.n_facies() {
            let sum = fraction_sums[index];
            if !approx_eq(sum, 1.0, eps) {
                return Err(TruncError::FractionSum {
                    rule: rule.to_string(),
                    facies: registry.facies_in_rule()[index].clone(),
                    sum,
                });
            }
        }

        Ok(model)
    }

    pub fn groups(&self) -> &[OverlayGroup] {
        &self.groups
    }

    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group painting over the given background facies, if any
    pub fn group_for_background(&self, rule_index: usize) -> Option<usize> {
        self.group_for_background.get(rule_index).copied().flatten()
    }

    /// Split facies probabilities (in rule order) into background areas and
    /// overlay intervals.
    ///
    /// Entries are peeled off in order. Each takes the share `delta` of what
    /// the previous entries left, so the background of a group keeps the
    /// product of `1 - delta` over all entries.
    pub fn adjust(&self, probs_in_rule: &[f64], n_background: usize, eps: f64) -> OverlayAdjustment {
        let mut background_areas = probs_in_rule[..n_background].to_vec();
        let mut intervals = Vec::with_capacity(self.groups.len());

        for group in &self.groups {
            let sum_background: f64 = group
                .background_facies
                .iter()
                .map(|&b| probs_in_rule[b])
                .sum();
            let sum_overlay: f64 = group
                .entries
                .iter()
                .map(|e| probs_in_rule[e.overlay_facies] * e.prob_fraction)
                .sum();

            let total = sum_background + sum_overlay;
            if total < eps {
                for &b in &group.background_facies {
                    background_areas[b] = 0.0;
                }
                intervals.push(vec![Interval::EMPTY; group.entries.len()]);
                continue;
            }

            let mut remaining = total;
            let mut kept = 1.0;
            let mut group_intervals = Vec::with_capacity(group.entries.len());
            for entry in &group.entries {
                // Earlier entries took the whole group volume
                if remaining < eps {
                    group_intervals.push(Interval::EMPTY);
                    continue;
                }
                let delta = probs_in_rule[entry.overlay_facies] * entry.prob_fraction / remaining;
                kept *= 1.0 - delta;
                remaining *= 1.0 - delta;
                group_intervals.push(Interval::centered(entry.center, delta));
            }

            if sum_background < eps {
                let share = total / group.background_facies.len() as f64;
                for &b in &group.background_facies {
                    background_areas[b] = share;
                }
            } else {
                for &b in &group.background_facies {
                    background_areas[b] = probs_in_rule[b] / kept;
                }
            }
            intervals.push(group_intervals);
        }

        OverlayAdjustment {
            background_areas,
            intervals,
        }
    }

    /// Overlay facies claiming a point already assigned to `background`.
    ///
    /// Entries of the group are tested in order and the first interval
    /// containing the point's alpha value wins.
    pub fn overlay_facies_for(
        &self,
        background: usize,
        alpha: &[f64],
        intervals: &[Vec<Interval>],
    ) -> Option<usize> {
        let g = self.group_for_background(background)?;
        self.groups[g]
            .entries
            .iter()
            .zip(&intervals[g])
            .find(|(entry, interval)| interval.contains(alpha[entry.alpha]))
            .map(|(entry, _)| entry.overlay_facies)
    }

    pub fn to_group_specs(
        &self,
        registry: &FaciesRegistry,
        alpha_fields: &AlphaFieldMap,
    ) -> Vec<GroupSpec> {
        let names = registry.facies_in_rule();
        self.groups
            .iter()
            .map(|group| GroupSpec {
                alpha_entries: group
                    .entries
                    .iter()
                    .map(|e| OverlayEntrySpec {
                        alpha_field: alpha_fields
                            .field_name(e.alpha)
                            .unwrap_or_default()
                            .to_string(),
                        overlay_facies: names[e.overlay_facies].clone(),
                        prob_fraction: e.prob_fraction,
                        center: e.center,
                    })
                    .collect(),
                background_facies: group
                    .background_facies
                    .iter()
                    .map(|&b| names[b].clone())
                    .collect(),
            })
            .collect()
    }
}
