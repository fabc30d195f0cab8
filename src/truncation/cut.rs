// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bisection search for the cut line carving a polygon of given area

use crate::config::TruncationSettings;
use crate::geometry::{subdivide_polygon_by_line, Polygon};
use crate::utils::math::deg_to_rad;
use nalgebra::{Point2, Vector2};

/// Smax values closer than this are treated as equal when picking a fragment
const TIE_EPS: f64 = 1e-12;

/// Family of parallel cut lines for one orientation angle.
///
/// The lines run along `direction`. They are indexed by the normalized
/// offset `s` along the sweep normal, measured from the corner of the unit
/// square where the sweep starts, so `s` runs from 0 to 1 across the square.
#[derive(Debug, Clone, PartialEq)]
pub struct CutFamily {
    direction: Vector2<f64>,
    normal: Vector2<f64>,
    corner: Point2<f64>,
    span: f64,
}

impl CutFamily {
    pub fn from_angle(angle_degrees: f64) -> Self {
        let radians = deg_to_rad(angle_degrees);
        let direction = Vector2::new(radians.cos(), radians.sin());
        let normal = Vector2::new(direction.y, -direction.x);
        let corner = match (normal.x >= 0.0, normal.y >= 0.0) {
            (true, true) => Point2::new(0.0, 0.0),
            (false, true) => Point2::new(1.0, 0.0),
            (true, false) => Point2::new(0.0, 1.0),
            (false, false) => Point2::new(1.0, 1.0),
        };
        Self {
            direction,
            normal,
            corner,
            span: normal.x.abs() + normal.y.abs(),
        }
    }

    pub fn direction(&self) -> &Vector2<f64> {
        &self.direction
    }

    pub fn normal(&self) -> &Vector2<f64> {
        &self.normal
    }

    /// Corner of the unit square at `s = 0`
    pub fn corner(&self) -> &Point2<f64> {
        &self.corner
    }

    /// Offset of the line through `p`
    pub fn s_of(&self, p: &Point2<f64>) -> f64 {
        self.normal.dot(&(p - self.corner)) / self.span
    }

    /// A point on the line with offset `s`
    pub fn point_at(&self, s: f64) -> Point2<f64> {
        self.corner + self.normal * (s * self.span)
    }

    /// Smallest and largest offset over the polygon's corners
    pub fn s_range(&self, polygon: &Polygon) -> Option<(f64, f64)> {
        let n = polygon.vertex_count();
        if n == 0 {
            return None;
        }
        Some(
            polygon.points()[..n]
                .iter()
                .map(|p| self.s_of(p))
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                    (lo.min(s), hi.max(s))
                }),
        )
    }

    /// Split `polygon` at offset `s` into the part nearer the start corner
    /// and the rest
    pub fn split_at(&self, polygon: &Polygon, s: f64) -> (Polygon, Polygon) {
        match subdivide_polygon_by_line(polygon, &self.point_at(s), &self.direction) {
            Some((a, b)) => {
                if self.is_nearer(&a, &b) {
                    (a, b)
                } else {
                    (b, a)
                }
            }
            None => {
                let nearer = polygon
                    .vertex_mean()
                    .map(|mean| self.s_of(&mean) < s)
                    .unwrap_or(false);
                if nearer {
                    (polygon.clone(), Polygon::empty())
                } else {
                    (Polygon::empty(), polygon.clone())
                }
            }
        }
    }

    /// Fragment with the smaller far offset is nearer; ties fall to the
    /// smaller near offset, then to `a`
    fn is_nearer(&self, a: &Polygon, b: &Polygon) -> bool {
        match (self.s_range(a), self.s_range(b)) {
            (Some((a_min, a_max)), Some((b_min, b_max))) => {
                if (a_max - b_max).abs() > TIE_EPS {
                    a_max < b_max
                } else {
                    a_min <= b_min
                }
            }
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

/// Outcome of a cut search
#[derive(Debug, Clone, PartialEq)]
pub struct Cut {
    /// Part of the residual carved off for the current facies
    pub inside: Polygon,
    /// What is left for the following polygons
    pub remainder: Polygon,
    pub s: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Find the line of `family` cutting off `target` area from `residual`.
///
/// When the iteration budget runs out the last candidate is returned with
/// `converged` unset.
pub fn find_cut(
    residual: &Polygon,
    family: &CutFamily,
    target: f64,
    settings: &TruncationSettings,
) -> Cut {
    let (s_min, s_max) = match family.s_range(residual) {
        Some(range) => range,
        None => {
            return Cut {
                inside: Polygon::empty(),
                remainder: residual.clone(),
                s: 0.0,
                iterations: 0,
                converged: true,
            }
        }
    };
    let mut s_low = s_min - settings.s_pad;
    let mut s_high = s_max + settings.s_pad;
    let total = residual.area();

    let at = |s: f64, iterations: usize| {
        let (inside, remainder) = family.split_at(residual, s);
        Cut {
            inside,
            remainder,
            s,
            iterations,
            converged: true,
        }
    };

    if target < settings.eps {
        return at(s_low, 0);
    }
    if target > total - settings.eps {
        return at(s_high, 0);
    }

    let mut cut = at(0.5 * (s_low + s_high), 0);
    for iteration in 1..=settings.max_bisection_iterations {
        let s = 0.5 * (s_low + s_high);
        cut = at(s, iteration);
        let area = cut.inside.area();
        cut.converged = (area - target).abs() < settings.bisection_tolerance;
        if cut.converged {
            break;
        }
        if area > target {
            s_high = s;
        } else {
            s_low = s;
        }
    }
    cut
}
