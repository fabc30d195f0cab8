// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Rule file round-trip tests

use anyhow::Result;
use aps_trunc::{io, AngleSpec, RuleFile, TruncError, TruncationSettings};
use std::collections::HashMap;
use tempfile::NamedTempFile;

const RULE_JSON: &str = r#"{
    "facies_table": [
        {"name": "Floodplain", "code": 1},
        {"name": "Channel", "code": 2},
        {"name": "Crevasse", "code": 3},
        {"name": "Coal", "code": 4}
    ],
    "rule": {
        "name": "zone_2",
        "facies_in_zone": ["Floodplain", "Channel", "Crevasse", "Coal"],
        "gauss_fields_in_zone": ["GRF1", "GRF2", "GRF3"],
        "background_alpha_fields": ["GRF2", "GRF1"],
        "polygons": [
            {"facies": "Channel", "angle": "channel_azimuth", "updatable": true},
            {"facies": "Crevasse", "angle": 30},
            {"facies": "Floodplain", "angle": -45.5}
        ],
        "overlay_groups": [
            {
                "alpha_entries": [
                    {"alpha_field": "GRF3", "overlay_facies": "Coal", "center": 0.8}
                ],
                "background_facies": ["Floodplain"]
            }
        ]
    },
    "settings": {"bisection_tolerance": 0.001}
}"#;

fn load() -> Result<RuleFile> {
    Ok(io::from_json(RULE_JSON)?)
}

#[test]
fn test_rule_file_builds() -> Result<()> {
    let file = load()?;
    assert_eq!(file.settings().bisection_tolerance, 0.001);
    assert_eq!(file.settings().max_bisection_iterations, 20);

    let rule = file.build()?;
    assert_eq!(rule.facies_in_rule(), ["Channel", "Crevasse", "Floodplain", "Coal"]);
    assert_eq!(rule.alpha_index_list(), &[1, 0, 2]);
    assert_eq!(rule.angle_parameter_names(), vec!["channel_azimuth".to_string()]);
    assert!(matches!(
        rule.background_model().polygons()[0].angle,
        AngleSpec::Parameter(_)
    ));

    let params = HashMap::from([("channel_azimuth".to_string(), 75.0)]);
    let map = rule.set_trunc_rule_with_params(&[0.4, 0.3, 0.2, 0.1], &params)?;
    assert_eq!(map.polygons().len(), 3);

    assert!(matches!(
        rule.set_trunc_rule(&[0.4, 0.3, 0.2, 0.1]),
        Err(TruncError::MissingParameter { .. })
    ));
    Ok(())
}

#[test]
fn test_json_round_trip_through_rule() -> Result<()> {
    let file = load()?;
    let rule = file.build()?;
    let exported = RuleFile {
        rule: rule.to_spec(),
        ..file.clone()
    };
    assert_eq!(exported, file);

    let temp = NamedTempFile::with_suffix(".json")?;
    io::write_rule_file(temp.path(), &exported)?;
    let reloaded = io::read_rule_file(temp.path())?;
    assert_eq!(reloaded, file);
    Ok(())
}

#[test]
fn test_toml_round_trip_gives_same_maps() -> Result<()> {
    let file = load()?;
    let temp = NamedTempFile::with_suffix(".toml")?;
    io::write_rule_file(temp.path(), &file)?;
    let reloaded = io::read_rule_file(temp.path())?;
    assert_eq!(reloaded, file);

    let params = HashMap::from([("channel_azimuth".to_string(), -120.0)]);
    let probs = [0.25, 0.25, 0.25, 0.25];
    let a = file.build()?.set_trunc_rule_with_params(&probs, &params)?;
    let b = reloaded.build()?.set_trunc_rule_with_params(&probs, &params)?;
    assert_eq!(a, b);
    Ok(())
}

#[test]
fn test_xml_export() -> Result<()> {
    let file = load()?;
    let temp = NamedTempFile::with_suffix(".xml")?;
    io::write_rule_file(temp.path(), &file)?;

    let xml = std::fs::read_to_string(temp.path())?;
    assert!(xml.contains("<TruncationRule name=\"zone_2\">"));
    assert!(xml.contains("<Angle parameter=\"channel_azimuth\"/>"));
    assert!(xml.contains("<Angle>-45.5</Angle>"));
    assert!(xml.contains("<BackGround>Floodplain</BackGround>"));
    Ok(())
}

#[test]
fn test_truncation_map_serializes() -> Result<()> {
    let mut file = load()?;
    file.settings = Some(TruncationSettings::default());
    let rule = file.build()?;
    let params = HashMap::from([("channel_azimuth".to_string(), 10.0)]);
    let map = rule.set_trunc_rule_with_params(&[0.1, 0.5, 0.2, 0.2], &params)?;

    let json = serde_json::to_string(&map)?;
    let back: aps_trunc::TruncMap = serde_json::from_str(&json)?;
    assert_eq!(back.polygons().len(), map.polygons().len());
    assert_eq!(back.determined_facies(), None);
    Ok(())
}

#[test]
fn test_invalid_rule_file_is_reported() -> Result<()> {
    let mut file = load()?;
    file.rule.polygons[1].prob_fraction = 0.5;
    assert!(matches!(file.build(), Err(TruncError::FractionSum { .. })));

    let mut file = load()?;
    file.rule.overlay_groups[0].alpha_entries[0].alpha_field = "GRF1".into();
    assert!(matches!(file.build(), Err(TruncError::OverlayConflict { .. })));

    let mut file = load()?;
    file.facies_table.pop();
    assert!(matches!(file.build(), Err(TruncError::NotInTable { .. })));
    Ok(())
}
