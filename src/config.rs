// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Numeric settings for the truncation engine

use crate::error::{Result, TruncError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tolerances and limits used when building and evaluating truncation maps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruncationSettings {
    /// Threshold for treating a probability or area as zero or one
    pub eps: f64,
    /// Allowed deviation of the probability sum from 1 before re-normalizing
    pub prob_sum_tolerance: f64,
    /// Accepted absolute area error for a bisection cut
    pub bisection_tolerance: f64,
    /// Bisection iterations before giving up on convergence
    pub max_bisection_iterations: usize,
    /// Padding added on both ends of the cut-line search interval
    pub s_pad: f64,
    /// Shift applied to a point that no polygon claims
    pub shift_tolerance: f64,
    /// Height of the placeholder rectangle used for empty polygons
    pub degenerate_height: f64,
}

impl Default for TruncationSettings {
    fn default() -> Self {
        Self {
            eps: 1e-4,
            prob_sum_tolerance: 1e-5,
            bisection_tolerance: 0.005,
            max_bisection_iterations: 20,
            s_pad: 0.01,
            shift_tolerance: 1e-7,
            degenerate_height: 1e-6,
        }
    }
}

impl TruncationSettings {
    /// Load settings from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let settings: TruncationSettings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load `aps_trunc.toml` from the working directory when present, then
    /// apply environment variable overrides
    pub fn load() -> Result<Self> {
        let settings = if PathBuf::from("aps_trunc.toml").exists() {
            Self::from_file("aps_trunc.toml")?
        } else {
            Self::default()
        };
        settings.with_env_overrides()
    }

    /// Apply the `APS_TRUNC_*` environment variables on top of these settings
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(eps) = std::env::var("APS_TRUNC_EPS") {
            self.eps = parse_env("APS_TRUNC_EPS", &eps)?;
        }

        if let Ok(tolerance) = std::env::var("APS_TRUNC_BISECTION_TOLERANCE") {
            self.bisection_tolerance = parse_env("APS_TRUNC_BISECTION_TOLERANCE", &tolerance)?;
        }

        if let Ok(iterations) = std::env::var("APS_TRUNC_MAX_ITERATIONS") {
            self.max_bisection_iterations = parse_env("APS_TRUNC_MAX_ITERATIONS", &iterations)?;
        }

        if let Ok(shift) = std::env::var("APS_TRUNC_SHIFT_TOLERANCE") {
            self.shift_tolerance = parse_env("APS_TRUNC_SHIFT_TOLERANCE", &shift)?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Save settings to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("eps", self.eps),
            ("prob_sum_tolerance", self.prob_sum_tolerance),
            ("bisection_tolerance", self.bisection_tolerance),
            ("shift_tolerance", self.shift_tolerance),
            ("degenerate_height", self.degenerate_height),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(TruncError::InvalidSettings(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if self.s_pad < 0.0 || !self.s_pad.is_finite() {
            return Err(TruncError::InvalidSettings(format!(
                "s_pad must be non-negative, got {}",
                self.s_pad
            )));
        }
        if self.max_bisection_iterations == 0 {
            return Err(TruncError::InvalidSettings(
                "max_bisection_iterations must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| TruncError::InvalidSettings(format!("{} has invalid value '{}'", name, value)))
}
