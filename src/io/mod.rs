// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - rule file reading and exporting

mod importer;
mod xml;

pub use importer::{
    from_json, from_toml, read_rule_file, to_json, to_toml, write_rule_file, RuleFormat,
};
pub use xml::rule_to_xml;
