// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Truncation rule for one zone

use super::{BackgroundModel, FaciesClassifier, NonCubic, TruncMap};
use crate::config::TruncationSettings;
use crate::error::{Result, TruncError};
use crate::facies::{AlphaFieldMap, FaciesRegistry, FaciesTable};
use crate::geometry::Polygon;
use crate::overlay::OverlayModel;
use crate::records::TruncRuleSpec;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Validated truncation rule.
///
/// The rule is immutable once built. Each probability vector produces its
/// own [`TruncMap`], so one rule can serve many cells.
#[derive(Debug, Clone)]
pub struct TruncationRule<M: BackgroundModel = NonCubic> {
    name: String,
    registry: FaciesRegistry,
    alpha_fields: AlphaFieldMap,
    background: M,
    overlay: OverlayModel,
    settings: TruncationSettings,
}

impl<M: BackgroundModel> TruncationRule<M> {
    /// Build a rule from its records, checking every cross reference
    pub fn initialize(
        table: &FaciesTable,
        spec: &TruncRuleSpec,
        settings: TruncationSettings,
    ) -> Result<Self> {
        settings.validate()?;
        let rule = spec.name.as_str();

        let background = M::from_polygon_specs(rule, &spec.polygons, &settings)?;
        let overlay_names = OverlayModel::overlay_facies_names(&spec.overlay_groups);
        let registry = FaciesRegistry::new(
            rule,
            table,
            &spec.facies_in_zone,
            background.background_facies(),
            &overlay_names,
        )?;
        if registry.facies_in_rule()[..registry.n_background()] != *background.background_facies() {
            return Err(TruncError::IndexInvariant(format!(
                "background facies {:?} are not first in rule facies {:?}",
                background.background_facies(),
                registry.facies_in_rule()
            )));
        }

        let mut alpha_fields = AlphaFieldMap::new(
            rule,
            &spec.gauss_fields_in_zone,
            &spec.background_alpha_fields,
        )?;
        let overlay = OverlayModel::build(
            rule,
            &spec.overlay_groups,
            &registry,
            &mut alpha_fields,
            settings.eps,
        )?;

        debug!(
            rule,
            model = background.name(),
            n_background = registry.n_background(),
            n_overlay = registry.n_overlay(),
            n_alpha = alpha_fields.n_alpha(),
            "initialized truncation rule"
        );

        Ok(Self {
            name: spec.name.clone(),
            registry,
            alpha_fields,
            background,
            overlay,
            settings,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &TruncationSettings {
        &self.settings
    }

    pub fn registry(&self) -> &FaciesRegistry {
        &self.registry
    }

    pub fn background_model(&self) -> &M {
        &self.background
    }

    pub fn overlay_model(&self) -> &OverlayModel {
        &self.overlay
    }

    pub fn facies_in_zone(&self) -> &[String] {
        self.registry.facies_in_zone()
    }

    pub fn facies_in_rule(&self) -> &[String] {
        self.registry.facies_in_rule()
    }

    pub fn order_index(&self) -> &[usize] {
        self.registry.order_index()
    }

    pub fn n_background_facies(&self) -> usize {
        self.registry.n_background()
    }

    pub fn n_overlay_facies(&self) -> usize {
        self.registry.n_overlay()
    }

    /// Gaussian field index for each alpha coordinate
    pub fn alpha_index_list(&self) -> &[usize] {
        self.alpha_fields.alpha_index_list()
    }

    pub fn alpha_field_names(&self) -> Vec<&str> {
        self.alpha_fields.field_names()
    }

    /// Number of alpha coordinates a classified point must carry
    pub fn n_alpha_used(&self) -> usize {
        self.alpha_fields.n_alpha()
    }

    pub fn angle_parameter_names(&self) -> Vec<String> {
        self.background.parameter_names()
    }

    /// Validate, clamp and normalize zone-ordered facies probabilities
    pub fn normalize_probabilities(&self, probs: &[f64]) -> Result<Vec<f64>> {
        let n = self.registry.n_facies();
        if probs.len() != n {
            return Err(TruncError::ProbabilityLength {
                rule: self.name.clone(),
                expected: n,
                got: probs.len(),
            });
        }

        let eps = self.settings.eps;
        let mut clamped = Vec::with_capacity(n);
        for (name, &p) in self.registry.facies_in_zone().iter().zip(probs) {
            if !p.is_finite() || p < -eps {
                return Err(TruncError::InvalidProbability {
                    rule: self.name.clone(),
                    facies: name.clone(),
                    value: p,
                });
            }
            clamped.push(p.clamp(0.0, 1.0));
        }

        let sum: f64 = clamped.iter().sum();
        if sum <= 0.0 {
            return Err(TruncError::ProbabilitySum {
                rule: self.name.clone(),
                sum,
            });
        }
        if (sum - 1.0).abs() > self.settings.prob_sum_tolerance {
            warn!(
                rule = %self.name,
                sum,
                "facies probabilities do not sum to 1, normalizing"
            );
        }
        Ok(clamped.into_iter().map(|p| p / sum).collect())
    }

    /// Truncation map for zone-ordered facies probabilities
    pub fn set_trunc_rule(&self, probs: &[f64]) -> Result<TruncMap> {
        self.set_trunc_rule_with_params(probs, &HashMap::new())
    }

    /// Truncation map for facies probabilities and per-cell angle parameters
    pub fn set_trunc_rule_with_params(
        &self,
        probs: &[f64],
        params: &HashMap<String, f64>,
    ) -> Result<TruncMap> {
        let probabilities = self.normalize_probabilities(probs)?;
        let in_rule = self.registry.to_rule_order(&probabilities);
        let n_background = self.registry.n_background();
        let eps = self.settings.eps;

        let adjustment = self.overlay.adjust(&in_rule, n_background, eps);
        let facies_index_per_polygon = self.background.facies_index_per_polygon();
        let determined = in_rule.iter().position(|&p| p >= 1.0 - eps);

        let polygons = match determined {
            Some(rule_index) => self.determined_polygons(rule_index, &facies_index_per_polygon),
            None => self.background.compute_polygons(
                &self.name,
                &adjustment.background_areas,
                params,
                &self.settings,
            )?,
        };

        let determined = determined.map(|r| self.registry.zone_index_for_rule_index(r));
        debug!(
            rule = %self.name,
            determined = ?determined,
            n_polygons = polygons.len(),
            "updated truncation map"
        );

        Ok(TruncMap {
            probabilities,
            determined,
            background_areas: adjustment.background_areas,
            polygons,
            facies_index_per_polygon,
            intervals: adjustment.intervals,
        })
    }

    /// The first polygon of a certain background facies covers the square,
    /// every other polygon collapses
    fn determined_polygons(&self, rule_index: usize, facies_per_polygon: &[usize]) -> Vec<Polygon> {
        let full = facies_per_polygon.iter().position(|&f| f == rule_index);
        (0..facies_per_polygon.len())
            .map(|i| {
                if Some(i) == full {
                    Polygon::unit_square()
                } else {
                    Polygon::degenerate(self.settings.degenerate_height)
                }
            })
            .collect()
    }

    /// Area each polygon of `map` was cut to
    pub fn polygon_targets(&self, map: &TruncMap) -> Vec<f64> {
        map.facies_index_per_polygon
            .iter()
            .enumerate()
            .map(|(i, &facies)| {
                map.background_areas[facies] * self.background.prob_fraction_for_polygon(i)
            })
            .collect()
    }

    pub fn classifier<'a>(&'a self, map: &'a TruncMap) -> Result<FaciesClassifier<'a, M>> {
        FaciesClassifier::new(self, map)
    }

    /// Facies code and zone index for one point
    pub fn define_facies_by_trunc_rule(&self, map: &TruncMap, alpha: &[f64]) -> Result<(i32, usize)> {
        self.classifier(map)?.classify(alpha)
    }

    /// Facies codes and zone indices for a batch of points given as one
    /// column per alpha coordinate
    pub fn define_facies_by_trunc_rule_vectorized(
        &self,
        map: &TruncMap,
        columns: &[&[f64]],
    ) -> Result<(Vec<i32>, Vec<usize>)> {
        self.classifier(map)?.classify_batch(columns)
    }

    /// Records reproducing this rule
    pub fn to_spec(&self) -> TruncRuleSpec {
        TruncRuleSpec {
            name: self.name.clone(),
            facies_in_zone: self.registry.facies_in_zone().to_vec(),
            gauss_fields_in_zone: self.alpha_fields.fields_in_zone().to_vec(),
            background_alpha_fields: self
                .alpha_fields
                .field_names()
                .into_iter()
                .take(2)
                .map(String::from)
                .collect(),
            polygons: self.background.to_polygon_specs(),
            overlay_groups: self.overlay.to_group_specs(&self.registry, &self.alpha_fields),
        }
    }
}

impl TruncationRule<NonCubic> {
    /// Copy of the rule with new constant polygon angles
    pub fn with_angles(&self, angles: &[f64]) -> Result<Self> {
        Ok(Self {
            background: self.background.with_angles(&self.name, angles)?,
            ..self.clone()
        })
    }

    pub fn updatable_angles(&self) -> Vec<(usize, f64)> {
        self.background.updatable_angles()
    }
}
