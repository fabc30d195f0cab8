// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Partition, area and classification properties of truncation rules

use anyhow::Result;
use approx::assert_relative_eq;
use aps_trunc::{
    FaciesTable, GroupSpec, OverlayEntrySpec, PolygonSpec, TruncMap, TruncRuleSpec,
    TruncationRule, TruncationSettings,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn table() -> FaciesTable {
    FaciesTable::from_pairs([("F1", 11), ("F2", 12), ("F3", 13), ("F4", 14), ("F5", 15)]).unwrap()
}

/// Three background facies in four polygons, two overlay groups
fn layered_spec() -> TruncRuleSpec {
    TruncRuleSpec {
        name: "layered".into(),
        facies_in_zone: names(&["F4", "F1", "F5", "F2", "F3"]),
        gauss_fields_in_zone: names(&["GRF1", "GRF2", "GRF3", "GRF4"]),
        background_alpha_fields: names(&["GRF1", "GRF2"]),
        polygons: vec![
            PolygonSpec::new("F1", 45.0, 0.6),
            PolygonSpec::new("F2", -30.0, 1.0),
            PolygonSpec::new("F1", 120.0, 0.4),
            PolygonSpec::new("F3", 200.0, 1.0),
        ],
        overlay_groups: vec![
            GroupSpec {
                alpha_entries: vec![OverlayEntrySpec::new("GRF3", "F4", 1.0, 0.5)],
                background_facies: names(&["F1"]),
            },
            GroupSpec {
                alpha_entries: vec![OverlayEntrySpec::new("GRF4", "F5", 1.0, 0.2)],
                background_facies: names(&["F2", "F3"]),
            },
        ],
    }
}

/// Tight enough that accumulated cut errors stay well below 0.01
fn tight_settings() -> TruncationSettings {
    TruncationSettings {
        bisection_tolerance: 0.002,
        ..Default::default()
    }
}

fn layered_rule() -> Result<TruncationRule> {
    Ok(TruncationRule::initialize(&table(), &layered_spec(), tight_settings())?)
}

fn random_probabilities(rng: &mut StdRng, n: usize) -> Vec<f64> {
    let raw: Vec<f64> = (0..n).map(|_| rng.gen_range(0.05..1.0)).collect();
    let sum: f64 = raw.iter().sum();
    raw.into_iter().map(|p| p / sum).collect()
}

fn random_columns(rng: &mut StdRng, n_alpha: usize, n: usize) -> Vec<Vec<f64>> {
    (0..n_alpha)
        .map(|_| (0..n).map(|_| rng.gen::<f64>()).collect())
        .collect()
}

fn polygon_vertices(map: &TruncMap) -> Vec<Vec<(f64, f64)>> {
    map.polygons()
        .iter()
        .map(|p| p.points().iter().map(|v| (v.x, v.y)).collect())
        .collect()
}

#[test]
fn test_partition_completeness() -> Result<()> {
    let rule = layered_rule()?;
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..10 {
        let probs = random_probabilities(&mut rng, 5);
        let map = rule.set_trunc_rule(&probs)?;

        let total: f64 = map.polygon_areas().iter().sum();
        assert_relative_eq!(total, 1.0, epsilon = 0.01);

        let classifier = rule.classifier(&map)?;
        for _ in 0..1500 {
            let x: f64 = rng.gen();
            let y: f64 = rng.gen();
            let owners = map.polygons().iter().filter(|p| p.contains(x, y)).count();
            assert!(owners <= 1, "({}, {}) is inside {} polygons", x, y, owners);

            let alpha = [x, y, rng.gen(), rng.gen()];
            classifier.classify(&alpha)?;
        }
    }
    Ok(())
}

#[test]
fn test_polygon_area_correctness() -> Result<()> {
    let rule = layered_rule()?;
    let polygons = rule.background_model().polygons().to_vec();
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..25 {
        let probs = random_probabilities(&mut rng, 5);
        let map = rule.set_trunc_rule(&probs)?;
        for (i, (polygon, spec)) in map.polygons().iter().zip(&polygons).enumerate() {
            let target = map.background_areas()[spec.facies] * spec.prob_fraction;
            assert!(
                (polygon.area() - target).abs() < 0.01,
                "polygon {} has area {} for target {} (probs {:?})",
                i,
                polygon.area(),
                target,
                probs
            );
        }
    }
    Ok(())
}

#[test]
fn test_default_settings_area_bounds() -> Result<()> {
    let settings = TruncationSettings::default();
    let tolerance = settings.bisection_tolerance;
    let rule: TruncationRule = TruncationRule::initialize(&table(), &layered_spec(), settings)?;
    let n = rule.background_model().polygons().len();
    let mut rng = StdRng::seed_from_u64(23);

    for _ in 0..50 {
        let probs = random_probabilities(&mut rng, 5);
        let map = rule.set_trunc_rule(&probs)?;
        let targets = rule.polygon_targets(&map);
        let areas = map.polygon_areas();

        // Carved polygons meet the cut tolerance, the residual collects
        // the errors of every earlier cut
        for i in 0..n - 1 {
            assert!(
                (areas[i] - targets[i]).abs() < tolerance,
                "polygon {} has area {} for target {}",
                i,
                areas[i],
                targets[i]
            );
        }
        let last = (areas[n - 1] - targets[n - 1]).abs();
        assert!(last < (n - 1) as f64 * tolerance, "residual error {}", last);
    }
    Ok(())
}

#[test]
fn test_default_settings_area_correctness_two_facies() -> Result<()> {
    let spec = TruncRuleSpec {
        name: "pair".into(),
        facies_in_zone: names(&["F1", "F2"]),
        gauss_fields_in_zone: names(&["GRF1", "GRF2"]),
        background_alpha_fields: names(&["GRF1", "GRF2"]),
        polygons: vec![
            PolygonSpec::new("F1", 63.0, 1.0),
            PolygonSpec::new("F2", 0.0, 1.0),
        ],
        overlay_groups: Vec::new(),
    };
    let rule: TruncationRule =
        TruncationRule::initialize(&table(), &spec, TruncationSettings::default())?;
    for p in [0.05, 0.2, 0.37, 0.5, 0.81, 0.95] {
        let map = rule.set_trunc_rule(&[p, 1.0 - p])?;
        let areas = map.polygon_areas();
        assert!((areas[0] - p).abs() < 0.01);
        assert!((areas[1] - (1.0 - p)).abs() < 0.01);
    }
    Ok(())
}

#[test]
fn test_repeated_evaluation_is_bit_identical() -> Result<()> {
    let rule = layered_rule()?;
    let probs = [0.1, 0.3, 0.15, 0.25, 0.2];
    let first = rule.set_trunc_rule(&probs)?;
    let other = rule.set_trunc_rule(&[0.2, 0.2, 0.2, 0.2, 0.2])?;
    let second = rule.set_trunc_rule(&probs)?;

    assert_eq!(polygon_vertices(&first), polygon_vertices(&second));
    assert_eq!(first, second);
    assert_ne!(polygon_vertices(&first), polygon_vertices(&other));
    Ok(())
}

#[test]
fn test_overlay_fractions_sum_to_one() -> Result<()> {
    let rule = layered_rule()?;
    let overlay = rule.overlay_model();
    let n_background = rule.n_background_facies();
    for facies in n_background..rule.facies_in_rule().len() {
        let sum: f64 = overlay
            .groups()
            .iter()
            .flat_map(|g| g.entries.iter())
            .filter(|e| e.overlay_facies == facies)
            .map(|e| e.prob_fraction)
            .sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-4);
    }
    Ok(())
}

#[test]
fn test_overlay_probability_is_conserved() -> Result<()> {
    let rule = layered_rule()?;
    let mut rng = StdRng::seed_from_u64(3);
    let probs = random_probabilities(&mut rng, 5);
    let map = rule.set_trunc_rule(&probs)?;
    let in_rule = rule.registry().to_rule_order(map.probabilities());

    for (group, intervals) in rule
        .overlay_model()
        .groups()
        .iter()
        .zip(map.overlay_intervals())
    {
        let group_area: f64 = group
            .background_facies
            .iter()
            .map(|&b| map.background_areas()[b])
            .sum();
        let mut left = group_area;
        for (entry, interval) in group.entries.iter().zip(intervals) {
            let share = left * interval.width();
            assert_relative_eq!(
                share,
                in_rule[entry.overlay_facies] * entry.prob_fraction,
                epsilon = 1e-9
            );
            left -= share;
        }
    }
    Ok(())
}

#[test]
fn test_sampled_frequencies_follow_probabilities() -> Result<()> {
    let rule = layered_rule()?;
    let probs = [0.15, 0.3, 0.1, 0.25, 0.2];
    let map = rule.set_trunc_rule(&probs)?;

    let n = 20_000;
    let mut rng = StdRng::seed_from_u64(2025);
    let columns = random_columns(&mut rng, rule.n_alpha_used(), n);
    let refs: Vec<&[f64]> = columns.iter().map(Vec::as_slice).collect();
    let (_, zone_indices) = rule.define_facies_by_trunc_rule_vectorized(&map, &refs)?;

    let mut counts = [0usize; 5];
    for z in zone_indices {
        counts[z] += 1;
    }
    for (count, p) in counts.iter().zip(probs) {
        let frequency = *count as f64 / n as f64;
        assert!(
            (frequency - p).abs() < 0.03,
            "frequency {} for probability {}",
            frequency,
            p
        );
    }
    Ok(())
}

#[test]
fn test_determined_facies_shortcut() -> Result<()> {
    let rule = layered_rule()?;
    let settings = rule.settings().clone();

    // Zone index 3 is F2, a background facies owning polygon 1
    let map = rule.set_trunc_rule(&[0.0, 0.0, 0.0, 1.0, 0.0])?;
    assert_eq!(map.determined_facies(), Some(3));
    for (i, polygon) in map.polygons().iter().enumerate() {
        if i == 1 {
            assert_relative_eq!(polygon.area(), 1.0);
        } else {
            assert_relative_eq!(polygon.area(), settings.degenerate_height, epsilon = 1e-12);
        }
    }

    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..200 {
        let alpha = [rng.gen(), rng.gen(), rng.gen(), rng.gen()];
        assert_eq!(rule.define_facies_by_trunc_rule(&map, &alpha)?, (12, 3));
    }
    // Coordinates are not consulted at all
    assert_eq!(rule.define_facies_by_trunc_rule(&map, &[5.0, -3.0])?, (12, 3));

    // Zone index 0 is F4, an overlay facies
    let map = rule.set_trunc_rule(&[1.0, 0.0, 0.0, 0.0, 0.0])?;
    assert_eq!(map.determined_facies(), Some(0));
    let columns = random_columns(&mut rng, 4, 100);
    let refs: Vec<&[f64]> = columns.iter().map(Vec::as_slice).collect();
    let (codes, indices) = rule.define_facies_by_trunc_rule_vectorized(&map, &refs)?;
    assert!(codes.iter().all(|&c| c == 14));
    assert!(indices.iter().all(|&i| i == 0));
    Ok(())
}

#[test]
fn test_overlay_interval_boundaries() -> Result<()> {
    let spec = TruncRuleSpec {
        name: "boundary".into(),
        facies_in_zone: names(&["F1", "F2", "F3"]),
        gauss_fields_in_zone: names(&["GRF1", "GRF2", "GRF3"]),
        background_alpha_fields: names(&["GRF1", "GRF2"]),
        polygons: vec![
            PolygonSpec::new("F1", 90.0, 1.0),
            PolygonSpec::new("F2", -90.0, 1.0),
        ],
        overlay_groups: vec![GroupSpec {
            alpha_entries: vec![OverlayEntrySpec::new("GRF3", "F3", 1.0, 0.5)],
            background_facies: names(&["F1"]),
        }],
    };
    let rule: TruncationRule =
        TruncationRule::initialize(&table(), &spec, TruncationSettings::default())?;

    // F1 and F3 share F1's half of the square, F3 takes 40% of it
    let map = rule.set_trunc_rule(&[0.3, 0.5, 0.2])?;
    let interval = map.overlay_intervals()[0][0];
    assert_relative_eq!(interval.low, 0.3, epsilon = 1e-12);
    assert_relative_eq!(interval.high, 0.7, epsilon = 1e-12);

    let at_low = rule.define_facies_by_trunc_rule(&map, &[0.2, 0.5, interval.low])?;
    let at_high = rule.define_facies_by_trunc_rule(&map, &[0.2, 0.5, interval.high])?;
    assert_eq!(at_low, (11, 0));
    assert_eq!(at_high, (13, 2));

    let xs = [0.2, 0.2];
    let ys = [0.5, 0.5];
    let zs = [interval.low, interval.high];
    let (codes, _) = rule.define_facies_by_trunc_rule_vectorized(&map, &[&xs, &ys, &zs])?;
    assert_eq!(codes, vec![11, 13]);
    Ok(())
}

#[test]
fn test_vectorized_matches_scalar() -> Result<()> {
    let rule = layered_rule()?;
    let mut rng = StdRng::seed_from_u64(42);
    let probs = random_probabilities(&mut rng, 5);
    let map = rule.set_trunc_rule(&probs)?;

    let n = 10_000;
    let columns = random_columns(&mut rng, rule.n_alpha_used(), n);
    let refs: Vec<&[f64]> = columns.iter().map(Vec::as_slice).collect();
    let (codes, indices) = rule.define_facies_by_trunc_rule_vectorized(&map, &refs)?;
    assert_eq!(codes.len(), n);

    let classifier = rule.classifier(&map)?;
    for j in 0..n {
        let alpha: Vec<f64> = columns.iter().map(|c| c[j]).collect();
        assert_eq!(classifier.classify(&alpha)?, (codes[j], indices[j]), "point {}", j);
    }
    Ok(())
}

#[test]
fn test_two_facies_vertical_split() -> Result<()> {
    let spec = TruncRuleSpec {
        name: "split".into(),
        facies_in_zone: names(&["F1", "F2"]),
        gauss_fields_in_zone: names(&["GRF1", "GRF2"]),
        background_alpha_fields: names(&["GRF1", "GRF2"]),
        polygons: vec![
            PolygonSpec::new("F1", 90.0, 1.0),
            PolygonSpec::new("F2", -90.0, 1.0),
        ],
        overlay_groups: Vec::new(),
    };
    let rule: TruncationRule =
        TruncationRule::initialize(&table(), &spec, TruncationSettings::default())?;
    let map = rule.set_trunc_rule(&[0.5, 0.5])?;

    let areas = map.polygon_areas();
    assert_relative_eq!(areas[0], 0.5, epsilon = 1e-9);
    assert_relative_eq!(areas[1], 0.5, epsilon = 1e-9);

    // The shared boundary is the line x = 0.5
    for polygon in map.polygons() {
        for v in polygon.points() {
            assert!(
                v.x.abs() < 1e-9 || (v.x - 0.5).abs() < 1e-9 || (v.x - 1.0).abs() < 1e-9,
                "unexpected vertex {:?}",
                v
            );
        }
    }

    assert_eq!(rule.define_facies_by_trunc_rule(&map, &[0.2, 0.5])?, (11, 0));
    assert_eq!(rule.define_facies_by_trunc_rule(&map, &[0.8, 0.5])?, (12, 1));
    Ok(())
}
