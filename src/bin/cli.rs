// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! APS truncation rule CLI

use anyhow::{bail, Context, Result};
use aps_trunc::cli::{FaciesFrequency, Reporter};
use aps_trunc::{io, RuleFile, TruncationRule, TruncationSettings};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aps-trunc")]
#[command(about = "Truncation rules for adaptive plurigaussian facies simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file overriding the rule file settings
    #[arg(short, long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a rule file and print its structure
    Check {
        /// Rule file (.json or .toml)
        rule: PathBuf,
    },

    /// Build the truncation map for a probability vector
    Polygons {
        rule: PathBuf,

        /// Facies probabilities in zone order, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        probs: Vec<f64>,

        /// Angle parameter value as NAME=VALUE
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, f64)>,

        /// Write the truncation map as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Classify one alpha point
    Classify {
        rule: PathBuf,

        #[arg(short, long, value_delimiter = ',', required = true)]
        probs: Vec<f64>,

        /// Alpha coordinates, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        point: Vec<f64>,

        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, f64)>,
    },

    /// Classify uniform random points and compare facies frequencies with
    /// the probabilities
    Sample {
        rule: PathBuf,

        #[arg(short, long, value_delimiter = ',', required = true)]
        probs: Vec<f64>,

        #[arg(short = 'n', long, default_value = "10000")]
        count: usize,

        #[arg(long, default_value = "42")]
        seed: u64,

        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, f64)>,
    },

    /// Write a rule file in another format (.json, .toml or .xml)
    Export {
        rule: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show version information
    Version,
}

fn parse_param(s: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for '{}': {}", name, e))?;
    Ok((name.trim().to_string(), value))
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        Reporter::report_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Check { rule } => {
            let (_, rule) = load_rule(rule, cli.settings.as_deref())?;
            Reporter::report_rule(&rule);
            Reporter::success("rule is valid");
        }
        Commands::Polygons {
            rule,
            probs,
            params,
            output,
        } => {
            let (_, rule) = load_rule(rule, cli.settings.as_deref())?;
            let params: HashMap<String, f64> = params.iter().cloned().collect();

            let start = Instant::now();
            let map = rule.set_trunc_rule_with_params(probs, &params)?;
            let elapsed = start.elapsed();

            if cli.verbose {
                Reporter::report_rule(&rule);
            }
            Reporter::report_map(&rule, &map, elapsed);

            if let Some(path) = output {
                let json = serde_json::to_string_pretty(&map)?;
                std::fs::write(path, json)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                Reporter::success(&format!("truncation map written to {}", path.display()));
            }
        }
        Commands::Classify {
            rule,
            probs,
            point,
            params,
        } => {
            let (_, rule) = load_rule(rule, cli.settings.as_deref())?;
            let params: HashMap<String, f64> = params.iter().cloned().collect();
            let map = rule.set_trunc_rule_with_params(probs, &params)?;
            let (code, zone_index) = rule.define_facies_by_trunc_rule(&map, point)?;
            println!(
                "{} {} (code {})",
                rule.facies_in_zone()[zone_index],
                zone_index,
                code
            );
        }
        Commands::Sample {
            rule,
            probs,
            count,
            seed,
            params,
        } => {
            let (_, rule) = load_rule(rule, cli.settings.as_deref())?;
            let params: HashMap<String, f64> = params.iter().cloned().collect();
            let map = rule.set_trunc_rule_with_params(probs, &params)?;

            let mut rng = StdRng::seed_from_u64(*seed);
            let columns: Vec<Vec<f64>> = (0..rule.n_alpha_used())
                .map(|_| (0..*count).map(|_| rng.gen::<f64>()).collect())
                .collect();
            let column_refs: Vec<&[f64]> = columns.iter().map(Vec::as_slice).collect();

            let start = Instant::now();
            let (codes, zone_indices) =
                rule.define_facies_by_trunc_rule_vectorized(&map, &column_refs)?;
            let elapsed = start.elapsed();

            let mut counts = vec![0usize; rule.facies_in_zone().len()];
            for &zone_index in &zone_indices {
                counts[zone_index] += 1;
            }
            let frequencies: Vec<FaciesFrequency> = rule
                .facies_in_zone()
                .iter()
                .enumerate()
                .map(|(i, name)| FaciesFrequency {
                    name: name.clone(),
                    code: rule.registry().code_for_zone_index(i),
                    probability: map.probabilities()[i],
                    count: counts[i],
                })
                .collect();
            Reporter::report_sample(&frequencies, codes.len(), elapsed);
        }
        Commands::Export { rule, output } => {
            let (file, rule) = load_rule(rule, cli.settings.as_deref())?;
            let exported = RuleFile {
                rule: rule.to_spec(),
                ..file
            };
            io::write_rule_file(output, &exported)
                .with_context(|| format!("failed to write {}", output.display()))?;
            Reporter::success(&format!("rule written to {}", output.display()));
        }
        Commands::Version => {
            println!("aps-trunc v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn load_rule(path: &Path, settings: Option<&Path>) -> Result<(RuleFile, TruncationRule)> {
    if !path.exists() {
        bail!("rule file not found: {}", path.display());
    }
    let mut file = io::read_rule_file(path)
        .with_context(|| format!("failed to read rule file {}", path.display()))?;
    if let Some(settings) = settings {
        file.settings = Some(TruncationSettings::from_file(settings).with_context(|| {
            format!("failed to read settings file {}", settings.display())
        })?);
    } else if file.settings.is_none() {
        file.settings = Some(TruncationSettings::load().context("failed to load settings")?);
    }
    let rule = file.build().context("invalid truncation rule")?;
    Ok((file, rule))
}
