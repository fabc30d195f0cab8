// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Truncation rule XML exporter

use crate::error::Result;
use crate::records::{AngleSpec, TruncRuleSpec};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

fn write_text_element<W: std::io::Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Render a rule as a `TruncationRule` XML document
pub fn rule_to_xml(spec: &TruncRuleSpec) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("TruncationRule");
    root.push_attribute(("name", spec.name.as_str()));
    writer.write_event(Event::Start(root))?;

    writer.write_event(Event::Start(BytesStart::new("NonCubic")))?;

    // Background model
    writer.write_event(Event::Start(BytesStart::new("BackGroundModel")))?;
    for field in &spec.background_alpha_fields {
        write_text_element(&mut writer, "AlphaField", field)?;
    }
    for polygon in &spec.polygons {
        let mut element = BytesStart::new("Polygon");
        element.push_attribute(("facies", polygon.facies.as_str()));
        element.push_attribute(("probFrac", polygon.prob_fraction.to_string().as_str()));
        element.push_attribute(("updatable", if polygon.updatable { "true" } else { "false" }));
        writer.write_event(Event::Start(element))?;
        match &polygon.angle {
            AngleSpec::Constant(angle) => {
                write_text_element(&mut writer, "Angle", &angle.to_string())?;
            }
            AngleSpec::Parameter(name) => {
                let mut angle = BytesStart::new("Angle");
                angle.push_attribute(("parameter", name.as_str()));
                writer.write_event(Event::Empty(angle))?;
            }
        }
        writer.write_event(Event::End(BytesEnd::new("Polygon")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("BackGroundModel")))?;

    // Overlay groups
    if !spec.overlay_groups.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("OverLayModel")))?;
        for group in &spec.overlay_groups {
            writer.write_event(Event::Start(BytesStart::new("Group")))?;
            for entry in &group.alpha_entries {
                let mut alpha = BytesStart::new("AlphaField");
                alpha.push_attribute(("name", entry.alpha_field.as_str()));
                writer.write_event(Event::Start(alpha))?;
                write_text_element(&mut writer, "TruncIntervalCenter", &entry.center.to_string())?;
                let mut facies = BytesStart::new("UseRegionForFacies");
                facies.push_attribute(("name", entry.overlay_facies.as_str()));
                facies.push_attribute(("probFrac", entry.prob_fraction.to_string().as_str()));
                writer.write_event(Event::Empty(facies))?;
                writer.write_event(Event::End(BytesEnd::new("AlphaField")))?;
            }
            for background in &group.background_facies {
                write_text_element(&mut writer, "BackGround", background)?;
            }
            writer.write_event(Event::End(BytesEnd::new("Group")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("OverLayModel")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("NonCubic")))?;
    writer.write_event(Event::End(BytesEnd::new("TruncationRule")))?;

    let result = writer.into_inner().into_inner();
    Ok(String::from_utf8(result)?)
}
