// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Overlay facies truncated on additional alpha fields

mod model;

pub use model::{Interval, OverlayAdjustment, OverlayEntry, OverlayGroup, OverlayModel};
