// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Closed polygons in the unit square

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Closed polygon; the last vertex repeats the first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point2<f64>>,
}

impl Polygon {
    /// Create a polygon, closing the vertex ring if it is open
    pub fn new(mut points: Vec<Point2<f64>>) -> Self {
        if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
            if points.len() > 1 && first != last {
                points.push(first);
            }
        }
        Self { points }
    }

    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    /// The whole alpha square
    pub fn unit_square() -> Self {
        Self::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ])
    }

    /// Thin strip along the bottom edge standing in for a facies with no area
    pub fn degenerate(height: f64) -> Self {
        Self::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, height),
            Point2::new(0.0, height),
        ])
    }

    /// Vertices including the closing vertex
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    /// Number of distinct corners
    pub fn vertex_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// A ring needs at least three corners to enclose anything
    pub fn is_empty(&self) -> bool {
        self.vertex_count() < 3
    }

    /// Consecutive vertex pairs
    pub fn edges(&self) -> impl Iterator<Item = (&Point2<f64>, &Point2<f64>)> {
        self.points.windows(2).map(|w| (&w[0], &w[1]))
    }

    /// Signed area, positive for counter-clockwise rings
    pub fn signed_area(&self) -> f64 {
        let twice: f64 = self
            .edges()
            .map(|(a, b)| a.x * b.y - b.x * a.y)
            .sum();
        twice / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Mean of the distinct corners
    pub fn vertex_mean(&self) -> Option<Point2<f64>> {
        let n = self.vertex_count();
        if n == 0 {
            return None;
        }
        let (sx, sy) = self.points[..n]
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Point2::new(sx / n as f64, sy / n as f64))
    }

    /// Ray-casting inside test.
    ///
    /// Counts edges crossed by the ray `(x + t, y)`, `t > 0`. The edge
    /// parameter is accepted on the closed range `[0, 1]`, so a crossing at
    /// the point itself is never counted while one at an edge end is.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        if self.is_empty() {
            return false;
        }
        let crossings = self
            .edges()
            .filter(|(a, b)| ray_crosses_edge(x, y, a, b))
            .count();
        crossings % 2 == 1
    }
}

/// Whether the +x ray from `(x, y)` crosses the segment `a`-`b`
#[inline]
pub fn ray_crosses_edge(x: f64, y: f64, a: &Point2<f64>, b: &Point2<f64>) -> bool {
    let dy = b.y - a.y;
    if dy == 0.0 {
        return false;
    }
    let s = (y - a.y) / dy;
    if !(0.0..=1.0).contains(&s) {
        return false;
    }
    let t = a.x + s * (b.x - a.x) - x;
    t > 0.0
}
