// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - polygons in the alpha unit square

mod polygon;
mod split;

pub use polygon::{ray_crosses_edge, Polygon};
pub use split::subdivide_polygon_by_line;
