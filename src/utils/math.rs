// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::Vector2;

/// Check if two floats are approximately equal
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Z component of the cross product of two plane vectors
pub fn cross2(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Move a coordinate by `shift`, reflecting back into the unit interval
/// when the shifted value would pass 1.0
pub fn shift_in_unit_interval(value: f64, shift: f64) -> f64 {
    let shifted = value + shift;
    if shifted > 1.0 {
        value - shift
    } else {
        shifted
    }
}

/// Convert degrees to radians
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * std::f64::consts::PI / 180.0
}
