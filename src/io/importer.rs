// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Rule file reading and writing

use super::xml::rule_to_xml;
use crate::error::{Result, TruncError};
use crate::records::RuleFile;
use std::fs;
use std::path::Path;

/// On-disk format of a rule file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    Json,
    Toml,
    /// Write-only
    Xml,
}

impl RuleFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(RuleFormat::Json),
            "toml" => Ok(RuleFormat::Toml),
            "xml" => Ok(RuleFormat::Xml),
            _ => Err(TruncError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

pub fn from_json(content: &str) -> Result<RuleFile> {
    Ok(serde_json::from_str(content)?)
}

pub fn to_json(file: &RuleFile) -> Result<String> {
    Ok(serde_json::to_string_pretty(file)?)
}

pub fn from_toml(content: &str) -> Result<RuleFile> {
    Ok(toml::from_str(content)?)
}

pub fn to_toml(file: &RuleFile) -> Result<String> {
    Ok(toml::to_string_pretty(file)?)
}

/// Read a JSON or TOML rule file
pub fn read_rule_file(path: impl AsRef<Path>) -> Result<RuleFile> {
    let path = path.as_ref();
    let format = RuleFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    match format {
        RuleFormat::Json => from_json(&content),
        RuleFormat::Toml => from_toml(&content),
        RuleFormat::Xml => Err(TruncError::UnsupportedFormat(format!(
            "{} (XML rule files are write-only)",
            path.display()
        ))),
    }
}

/// Write a rule file in the format its extension names
pub fn write_rule_file(path: impl AsRef<Path>, file: &RuleFile) -> Result<()> {
    let path = path.as_ref();
    let content = match RuleFormat::from_path(path)? {
        RuleFormat::Json => to_json(file)?,
        RuleFormat::Toml => to_toml(file)?,
        RuleFormat::Xml => rule_to_xml(&file.rule)?,
    };
    fs::write(path, content)?;
    Ok(())
}
