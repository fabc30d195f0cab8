// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Angle-based background model
//!
//! Polygons are carved from the unit square one after another. Each cut is a
//! straight line at the polygon's orientation angle, placed so the carved
//! piece has the facies area times the polygon's probability fraction. The
//! last polygon takes whatever is left.

use super::cut::{find_cut, CutFamily};
use super::BackgroundModel;
use crate::config::TruncationSettings;
use crate::error::{Result, TruncError};
use crate::geometry::Polygon;
use crate::records::{AngleSpec, PolygonSpec};
use crate::utils::math::approx_eq;
use std::collections::HashMap;
use tracing::{debug, warn};

/// One polygon of the background partition
#[derive(Debug, Clone, PartialEq)]
pub struct AnglePolygon {
    /// Index into the background facies list
    pub facies: usize,
    pub angle: AngleSpec,
    pub prob_fraction: f64,
    pub updatable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NonCubic {
    background_facies: Vec<String>,
    polygons: Vec<AnglePolygon>,
}

fn check_angle(rule: &str, facies: &str, angle: f64) -> Result<f64> {
    if angle.is_finite() && angle.abs() <= 360.0 {
        Ok(angle)
    } else {
        Err(TruncError::InvalidAngle {
            rule: rule.to_string(),
            facies: facies.to_string(),
            angle,
        })
    }
}

impl NonCubic {
    pub fn polygons(&self) -> &[AnglePolygon] {
        &self.polygons
    }

    /// Copy of the model with new constant angles, one per polygon
    pub fn with_angles(&self, rule: &str, angles: &[f64]) -> Result<Self> {
        if angles.len() != self.polygons.len() {
            return Err(TruncError::InvalidStructure {
                rule: rule.to_string(),
                reason: format!(
                    "expected {} angles, got {}",
                    self.polygons.len(),
                    angles.len()
                ),
            });
        }
        let mut model = self.clone();
        for (polygon, &angle) in model.polygons.iter_mut().zip(angles) {
            let name = &self.background_facies[polygon.facies];
            polygon.angle = AngleSpec::Constant(check_angle(rule, name, angle)?);
        }
        Ok(model)
    }

    /// Polygon indices and current constant angles of updatable polygons
    pub fn updatable_angles(&self) -> Vec<(usize, f64)> {
        self.polygons
            .iter()
            .enumerate()
            .filter(|(_, p)| p.updatable)
            .filter_map(|(i, p)| p.angle.as_constant().map(|a| (i, a)))
            .collect()
    }

    fn resolve_angle(
        &self,
        rule: &str,
        polygon: &AnglePolygon,
        params: &HashMap<String, f64>,
    ) -> Result<f64> {
        let name = &self.background_facies[polygon.facies];
        match &polygon.angle {
            AngleSpec::Constant(angle) => Ok(*angle),
            AngleSpec::Parameter(param) => {
                let angle = params
                    .get(param)
                    .copied()
                    .ok_or_else(|| TruncError::MissingParameter {
                        rule: rule.to_string(),
                        name: param.clone(),
                    })?;
                check_angle(rule, name, angle)
            }
        }
    }
}

impl BackgroundModel for NonCubic {
    fn name(&self) -> &'static str {
        "NonCubic"
    }

    fn from_polygon_specs(
        rule: &str,
        specs: &[PolygonSpec],
        settings: &TruncationSettings,
    ) -> Result<Self> {
        if specs.is_empty() {
            return Err(TruncError::InvalidStructure {
                rule: rule.to_string(),
                reason: "the background model has no polygons".into(),
            });
        }

        let mut background_facies: Vec<String> = Vec::new();
        let mut polygons = Vec::with_capacity(specs.len());
        for spec in specs {
            let facies = match background_facies.iter().position(|f| f == &spec.facies) {
                Some(i) => i,
                None => {
                    background_facies.push(spec.facies.clone());
                    background_facies.len() - 1
                }
            };
            if !(0.0..=1.0).contains(&spec.prob_fraction) {
                return Err(TruncError::InvalidFraction {
                    rule: rule.to_string(),
                    facies: spec.facies.clone(),
                    value: spec.prob_fraction,
                });
            }
            match &spec.angle {
                AngleSpec::Constant(angle) => {
                    check_angle(rule, &spec.facies, *angle)?;
                }
                AngleSpec::Parameter(name) if name.trim().is_empty() => {
                    return Err(TruncError::InvalidStructure {
                        rule: rule.to_string(),
                        reason: format!("empty angle parameter name for facies '{}'", spec.facies),
                    });
                }
                AngleSpec::Parameter(_) => {}
            }
            polygons.push(AnglePolygon {
                facies,
                angle: spec.angle.clone(),
                prob_fraction: spec.prob_fraction,
                updatable: spec.updatable,
            });
        }

        for (i, name) in background_facies.iter().enumerate() {
            let sum: f64 = polygons
                .iter()
                .filter(|p| p.facies == i)
                .map(|p| p.prob_fraction)
                .sum();
            if !approx_eq(sum, 1.0, settings.eps) {
                return Err(TruncError::FractionSum {
                    rule: rule.to_string(),
                    facies: name.clone(),
                    sum,
                });
            }
        }

        Ok(Self {
            background_facies,
            polygons,
        })
    }

    fn background_facies(&self) -> &[String] {
        &self.background_facies
    }

    fn n_polygons(&self) -> usize {
        self.polygons.len()
    }

    fn facies_index_for_polygon(&self, polygon: usize) -> usize {
        self.polygons[polygon].facies
    }

    fn prob_fraction_for_polygon(&self, polygon: usize) -> f64 {
        self.polygons[polygon].prob_fraction
    }

    fn parameter_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for polygon in &self.polygons {
            if let AngleSpec::Parameter(name) = &polygon.angle {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    fn compute_polygons(
        &self,
        rule: &str,
        areas: &[f64],
        params: &HashMap<String, f64>,
        settings: &TruncationSettings,
    ) -> Result<Vec<Polygon>> {
        let degenerate = || Polygon::degenerate(settings.degenerate_height);
        let last = self.polygons.len() - 1;
        let mut residual = Polygon::unit_square();
        let mut out = Vec::with_capacity(self.polygons.len());

        for (i, polygon) in self.polygons.iter().enumerate() {
            if i == last {
                out.push(if residual.is_empty() {
                    degenerate()
                } else {
                    residual.clone()
                });
                break;
            }

            let target = areas[polygon.facies] * polygon.prob_fraction;
            if target < settings.eps || residual.is_empty() {
                out.push(degenerate());
                continue;
            }

            let angle = self.resolve_angle(rule, polygon, params)?;
            let family = CutFamily::from_angle(angle);
            let cut = find_cut(&residual, &family, target, settings);
            let area = cut.inside.area();
            if !cut.converged {
                warn!(
                    rule,
                    polygon = i,
                    target,
                    area,
                    iterations = cut.iterations,
                    "cut line search did not converge, keeping last candidate"
                );
            }
            debug!(
                rule,
                polygon = i,
                facies = %self.background_facies[polygon.facies],
                angle,
                s = cut.s,
                target,
                area,
                "carved polygon"
            );

            out.push(if cut.inside.is_empty() {
                degenerate()
            } else {
                cut.inside
            });
            residual = cut.remainder;
        }

        Ok(out)
    }

    fn to_polygon_specs(&self) -> Vec<PolygonSpec> {
        self.polygons
            .iter()
            .map(|p| PolygonSpec {
                facies: self.background_facies[p.facies].clone(),
                angle: p.angle.clone(),
                prob_fraction: p.prob_fraction,
                updatable: p.updatable,
            })
            .collect()
    }
}
