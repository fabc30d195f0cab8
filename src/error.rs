// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for truncation rules

use thiserror::Error;

/// Errors raised while building or evaluating a truncation rule.
///
/// Configuration errors are raised by `TruncationRule::initialize` and leave
/// no usable rule behind. `Unclassified` and `IndexInvariant` signal a broken
/// partition rather than bad input.
#[derive(Error, Debug)]
pub enum TruncError {
    /// Facies name missing from the global facies table.
    #[error("facies '{facies}' is not defined in the facies table")]
    NotInTable { facies: String },

    /// Facies name or code used twice in the facies table.
    #[error("facies table already contains facies '{name}' or code {code}")]
    DuplicateFacies { name: String, code: i32 },

    /// Facies referenced by the rule but not modelled in the zone.
    #[error("rule '{rule}': facies '{facies}' is not in the zone facies list {zone:?}")]
    UnknownFacies {
        rule: String,
        facies: String,
        zone: Vec<String>,
    },

    /// Facies set of the rule differs from the zone facies set.
    #[error("rule '{rule}': facies in rule {in_rule:?} do not match facies in zone {in_zone:?}")]
    FaciesMismatch {
        rule: String,
        in_rule: Vec<String>,
        in_zone: Vec<String>,
    },

    /// Probability fractions of one facies do not add up to 1.
    #[error("rule '{rule}': probability fractions for facies '{facies}' sum to {sum}, expected 1.0")]
    FractionSum {
        rule: String,
        facies: String,
        sum: f64,
    },

    /// Probability fraction outside its legal range.
    #[error("rule '{rule}': probability fraction {value} for facies '{facies}' is out of range")]
    InvalidFraction {
        rule: String,
        facies: String,
        value: f64,
    },

    /// Overlay interval center outside [0, 1].
    #[error("rule '{rule}': interval center {value} for overlay facies '{facies}' is outside [0, 1]")]
    InvalidCenter {
        rule: String,
        facies: String,
        value: f64,
    },

    /// Overlay group specification contradicts itself or the background model.
    #[error("rule '{rule}': {reason}")]
    OverlayConflict { rule: String, reason: String },

    /// Gaussian field name not known for the zone.
    #[error("rule '{rule}': gaussian field '{field}' is not in the zone field list {zone:?}")]
    UnknownField {
        rule: String,
        field: String,
        zone: Vec<String>,
    },

    /// Orientation angle that is not a finite number in [-360, 360].
    #[error("rule '{rule}': angle {angle} for facies '{facies}' is invalid")]
    InvalidAngle {
        rule: String,
        facies: String,
        angle: f64,
    },

    /// Angle parameter without a value for the current cell.
    #[error("rule '{rule}': no value supplied for angle parameter '{name}'")]
    MissingParameter { rule: String, name: String },

    /// Structural problem with the rule records themselves.
    #[error("rule '{rule}': {reason}")]
    InvalidStructure { rule: String, reason: String },

    /// Probability vector of the wrong length.
    #[error("rule '{rule}': expected {expected} facies probabilities, got {got}")]
    ProbabilityLength {
        rule: String,
        expected: usize,
        got: usize,
    },

    /// Negative or non-finite probability.
    #[error("rule '{rule}': probability {value} for facies '{facies}' is invalid")]
    InvalidProbability {
        rule: String,
        facies: String,
        value: f64,
    },

    /// Probabilities that cannot be normalized.
    #[error("rule '{rule}': facies probabilities sum to {sum}, cannot normalize")]
    ProbabilitySum { rule: String, sum: f64 },

    /// Alpha coordinate vector too short for the rule, or ragged batch.
    #[error("rule '{rule}': expected {expected} alpha values, got {got}")]
    AlphaLength {
        rule: String,
        expected: usize,
        got: usize,
    },

    /// No polygon claims the point, even after the perturbation retry.
    #[error("rule '{rule}': point ({x}, {y}) is not inside any truncation polygon")]
    Unclassified { rule: String, x: f64, y: f64 },

    /// Internal index bookkeeping is inconsistent.
    #[error("index invariant violated: {0}")]
    IndexInvariant(String),

    /// Invalid engine settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Rule file extension that cannot be read or written.
    #[error("unsupported rule file format: {0}")]
    UnsupportedFormat(String),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("toml: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for truncation rule operations.
pub type Result<T> = std::result::Result<T, TruncError>;
