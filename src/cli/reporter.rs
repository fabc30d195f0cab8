// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::truncation::{BackgroundModel, TruncMap, TruncationRule};
use colored::*;
use std::time::Duration;

/// Observed frequency of one facies in a sampled batch
#[derive(Debug, Clone, PartialEq)]
pub struct FaciesFrequency {
    pub name: String,
    pub code: i32,
    pub probability: f64,
    pub count: usize,
}

impl FaciesFrequency {
    pub fn frequency(&self, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            self.count as f64 / total as f64
        }
    }
}

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report the structure of a validated rule
    pub fn report_rule<M: BackgroundModel>(rule: &TruncationRule<M>) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!(
            "{} {} ({})",
            "Rule:".bold(),
            rule.name().cyan(),
            rule.background_model().name()
        );
        println!("{}", "━".repeat(80).bright_black());
        println!(
            "  {} {}",
            "Background facies:".bright_black(),
            rule.facies_in_rule()[..rule.n_background_facies()].join(", ").cyan()
        );
        println!(
            "  {} {}",
            "Overlay facies:".bright_black(),
            rule.facies_in_rule()[rule.n_background_facies()..].join(", ").cyan()
        );
        println!(
            "  {} {}",
            "Alpha fields:".bright_black(),
            rule.alpha_field_names().join(", ").cyan()
        );
        let params = rule.angle_parameter_names();
        if !params.is_empty() {
            println!(
                "  {} {}",
                "Angle parameters:".bright_black(),
                params.join(", ").yellow()
            );
        }
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report polygons and overlay intervals of a truncation map
    pub fn report_map<M: BackgroundModel>(rule: &TruncationRule<M>, map: &TruncMap, duration: Duration) {
        let names = rule.facies_in_rule();
        let targets = rule.polygon_targets(map);
        println!("\n{}", "Polygons:".bold());
        for (i, ((polygon, &facies), target)) in map
            .polygons()
            .iter()
            .zip(map.facies_index_per_polygon())
            .zip(targets)
            .enumerate()
        {
            println!(
                "  {:>3} {:<12} {} {:.4} {} {:.4} {} {}",
                i,
                names[facies].cyan(),
                "area".bright_black(),
                polygon.area(),
                "target".bright_black(),
                target,
                "vertices".bright_black(),
                polygon.vertex_count()
            );
        }

        for (g, (group, intervals)) in rule
            .overlay_model()
            .groups()
            .iter()
            .zip(map.overlay_intervals())
            .enumerate()
        {
            println!("\n{} {}", "Overlay group".bold(), g);
            for (entry, interval) in group.entries.iter().zip(intervals) {
                println!(
                    "  {:<12} ({:.4}, {:.4}]",
                    names[entry.overlay_facies].cyan(),
                    interval.low,
                    interval.high
                );
            }
        }

        if let Some(zone_index) = map.determined_facies() {
            Self::report_info(&format!(
                "facies '{}' is certain, every point maps to it",
                rule.facies_in_zone()[zone_index]
            ));
        }
        println!(
            "\n  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
    }

    /// Report sampled facies frequencies against their probabilities
    pub fn report_sample(frequencies: &[FaciesFrequency], total: usize, duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {} points", "Sampled:".bold(), total.to_string().cyan());
        println!("{}", "━".repeat(80).bright_black());
        for f in frequencies {
            let observed = f.frequency(total);
            Self::print_metric(
                &format!("{} ({})", f.name, f.code),
                &format!("{:.4} vs {:.4}", observed, f.probability),
                (observed - f.probability).abs(),
            );
        }
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "error:".red().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("  {} {}", "note:".bright_blue(), message);
    }

    /// Print a metric with color coding based on delta
    fn print_metric(name: &str, value: &str, delta: f64) {
        let formatted_value = if delta < 0.01 {
            value.green()
        } else if delta < 0.05 {
            value.yellow()
        } else {
            value.red()
        };

        let delta_str = if delta > 0.0 {
            format!("(Δ{:.2}%)", delta * 100.0)
        } else {
            String::new()
        };

        println!(
            "  {} {} {}",
            format!("{}:", name).bright_black(),
            formatted_value,
            delta_str.bright_black()
        );
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("  {}", message.green());
    }
}
