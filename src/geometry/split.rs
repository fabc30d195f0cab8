// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Splitting a convex polygon by a straight line

use super::Polygon;
use crate::utils::math::cross2;
use nalgebra::{Point2, Vector2};

/// Cross products below this magnitude mean the line and edge are parallel
const PARALLEL_EPS: f64 = 1e-14;

/// Intersection of the line `point + t * direction` with the edge `a`-`b`.
///
/// The edge parameter must lie strictly inside `(0, 1)` so a line through a
/// vertex is not reported twice for the two edges meeting there.
fn line_edge_intersection(
    point: &Point2<f64>,
    direction: &Vector2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
) -> Option<Point2<f64>> {
    let edge = b - a;
    let denom = cross2(&edge, direction);
    if denom.abs() < PARALLEL_EPS {
        return None;
    }
    let offset = point - a;
    let u = cross2(&offset, direction) / denom;
    if u <= 0.0 || u >= 1.0 {
        return None;
    }
    Some(a + edge * u)
}

/// Split `polygon` by the line through `point` along `direction`.
///
/// Returns `None` when the line does not properly cross the polygon. The
/// first fragment runs from the first crossing to the second along the
/// vertex order, the second fragment covers the remaining arc. Both come
/// back closed.
pub fn subdivide_polygon_by_line(
    polygon: &Polygon,
    point: &Point2<f64>,
    direction: &Vector2<f64>,
) -> Option<(Polygon, Polygon)> {
    let pts = polygon.points();
    if polygon.is_empty() {
        return None;
    }

    // A convex ring is crossed exactly zero or two times.
    let mut crossings: Vec<(usize, Point2<f64>)> = Vec::with_capacity(2);
    for (i, w) in pts.windows(2).enumerate() {
        if let Some(p) = line_edge_intersection(point, direction, &w[0], &w[1]) {
            crossings.push((i, p));
            if crossings.len() == 2 {
                break;
            }
        }
    }
    if crossings.len() < 2 {
        return None;
    }

    let (i1, p1) = crossings[0];
    let (i2, p2) = crossings[1];
    let n = pts.len() - 1;

    let mut first = Vec::with_capacity(i2 - i1 + 3);
    first.push(p1);
    first.extend_from_slice(&pts[i1 + 1..=i2]);
    first.push(p2);

    let mut second = Vec::with_capacity(n - (i2 - i1) + 3);
    second.push(p2);
    second.extend_from_slice(&pts[i2 + 1..n]);
    second.extend_from_slice(&pts[..=i1]);
    second.push(p1);

    Some((Polygon::new(first), Polygon::new(second)))
}
