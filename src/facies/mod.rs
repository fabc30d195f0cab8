// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Facies and gaussian field bookkeeping

mod alpha;
mod registry;
mod table;

pub use alpha::AlphaFieldMap;
pub use registry::FaciesRegistry;
pub use table::{Facies, FaciesTable};
