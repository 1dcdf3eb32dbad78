// ABOUTME: Unit tests for the per-sample grade series
// ABOUTME: Covers elevation smoothing, the minimum-step guard, and non-finite handling
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use pierre_terrain::config::GradeSeriesConfig;
use pierre_terrain::grade::build_grade_series;
use pierre_terrain::samples::ActivitySamples;

fn samples_with_elevation(elevation: Vec<f64>, delta_distance: Vec<f64>) -> ActivitySamples {
    let n = elevation.len();
    let mut cumulative = Vec::with_capacity(n);
    let mut d = 0.0;
    for &dd in &delta_distance {
        d += dd;
        cumulative.push(d);
    }
    ActivitySamples {
        elapsed_time_s: (0..n).map(|i| i as f64).collect(),
        delta_time_s: vec![1.0; n],
        cumulative_distance_m: cumulative,
        delta_distance_m: delta_distance,
        elevation_m: elevation,
        ..ActivitySamples::default()
    }
}

#[test]
fn test_first_sample_has_no_grade() {
    let samples = samples_with_elevation(vec![100.0; 10], vec![10.0; 10]);
    let grade = build_grade_series(&samples, &GradeSeriesConfig::default());

    assert_eq!(grade.len(), 10);
    assert!(grade[0].is_nan());
}

#[test]
fn test_constant_slope_is_recovered_away_from_the_ends() {
    let elevation: Vec<f64> = (0..20).map(|i| 100.0 + 0.5 * i as f64).collect();
    let samples = samples_with_elevation(elevation, vec![10.0; 20]);
    let grade = build_grade_series(&samples, &GradeSeriesConfig::default());

    // The centered smoothing window is truncated near the ends, which
    // shifts those grades; the interior must read the true 5%.
    for (i, g) in grade.iter().enumerate().take(18).skip(4) {
        assert!((g - 5.0).abs() < 1e-9, "sample {i} has grade {g}");
    }
}

#[test]
fn test_short_steps_get_no_grade() {
    let elevation: Vec<f64> = (0..10).map(|i| 100.0 + 0.5 * i as f64).collect();
    let mut delta_distance = vec![10.0; 10];
    delta_distance[5] = 0.5;
    let samples = samples_with_elevation(elevation, delta_distance);
    let config = GradeSeriesConfig {
        smooth_window_points: 1,
        ..GradeSeriesConfig::default()
    };
    let grade = build_grade_series(&samples, &config);

    assert!(grade[5].is_nan());
    assert!((grade[4] - 5.0).abs() < 1e-9);
    assert!((grade[6] - 5.0).abs() < 1e-9);
}

#[test]
fn test_nan_step_gets_no_grade() {
    let elevation: Vec<f64> = (0..10).map(|i| 100.0 + 0.5 * i as f64).collect();
    let mut delta_distance = vec![10.0; 10];
    delta_distance[3] = f64::NAN;
    let samples = samples_with_elevation(elevation, delta_distance);
    let config = GradeSeriesConfig {
        smooth_window_points: 1,
        ..GradeSeriesConfig::default()
    };
    let grade = build_grade_series(&samples, &config);

    assert!(grade[3].is_nan());
    assert!((grade[4] - 5.0).abs() < 1e-9);
}

#[test]
fn test_zero_step_yields_nan_even_without_the_guard() {
    let mut elevation: Vec<f64> = (0..10).map(|i| 100.0 + 0.5 * i as f64).collect();
    elevation[3] += 0.2;
    let mut delta_distance = vec![10.0; 10];
    delta_distance[3] = 0.0;
    let samples = samples_with_elevation(elevation, delta_distance);
    let config = GradeSeriesConfig {
        smooth_window_points: 1,
        min_distance_step_m: 0.0,
    };
    let grade = build_grade_series(&samples, &config);

    // A division by zero is not a finite grade.
    assert!(grade[3].is_nan());
}

#[test]
fn test_unsmoothed_zigzag_alternates_sign() {
    let elevation: Vec<f64> = (0..12)
        .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
        .collect();
    let samples = samples_with_elevation(elevation, vec![10.0; 12]);
    let config = GradeSeriesConfig {
        smooth_window_points: 1,
        ..GradeSeriesConfig::default()
    };
    let grade = build_grade_series(&samples, &config);

    for (i, g) in grade.iter().enumerate().skip(1) {
        let expected = if i % 2 == 0 { -10.0 } else { 10.0 };
        assert!((g - expected).abs() < 1e-9, "sample {i} has grade {g}");
    }
}
