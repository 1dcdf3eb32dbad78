// ABOUTME: Unit tests for the pace-series builder
// ABOUTME: Covers smoothing geometry, NaN handling, cap clipping, and both pace modes
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use pierre_terrain::config::PaceSeriesConfig;
use pierre_terrain::moving::MovingMask;
use pierre_terrain::pace::{build_pace_series, default_pace_cap_min_per_km, PaceMode};
use pierre_terrain::samples::ActivitySamples;

fn samples_with_pace(pace: Vec<f64>) -> ActivitySamples {
    let n = pace.len();
    ActivitySamples {
        elapsed_time_s: (0..n).map(|i| i as f64).collect(),
        delta_time_s: vec![1.0; n],
        cumulative_distance_m: (0..n).map(|i| i as f64 * 3.0).collect(),
        delta_distance_m: vec![3.0; n],
        elevation_m: vec![100.0; n],
        pace_s_per_km: Some(pace),
        ..ActivitySamples::default()
    }
}

fn raw_config() -> PaceSeriesConfig {
    PaceSeriesConfig {
        mode: PaceMode::RealTime,
        smoothing_points: 0,
        cap_min_per_km: None,
    }
}

#[test]
fn test_real_time_passthrough_without_smoothing() {
    let samples = samples_with_pace(vec![300.0; 10]);
    let mask = MovingMask::all_moving(10);
    let pace = build_pace_series(&samples, &mask, &raw_config()).unwrap();

    assert_eq!(pace, vec![300.0; 10]);
}

#[test]
fn test_smoothing_excludes_nan_from_window_average() {
    let samples = samples_with_pace(vec![600.0, f64::NAN, 660.0]);
    let mask = MovingMask::all_moving(3);
    let config = PaceSeriesConfig {
        smoothing_points: 2,
        ..raw_config()
    };
    let pace = build_pace_series(&samples, &mask, &config).unwrap();

    // The NaN sample is excluded from both numerator and denominator, so it
    // does not drag its neighbours toward zero.
    assert!((pace[0] - 600.0).abs() < 1e-9);
    assert!((pace[1] - 630.0).abs() < 1e-9);
    assert!((pace[2] - 660.0).abs() < 1e-9);
}

#[test]
fn test_even_window_takes_extra_element_before() {
    let samples = samples_with_pace(vec![100.0, 200.0, 400.0]);
    let mask = MovingMask::all_moving(3);
    let config = PaceSeriesConfig {
        smoothing_points: 1,
        ..raw_config()
    };
    let pace = build_pace_series(&samples, &mask, &config).unwrap();

    assert!((pace[0] - 100.0).abs() < 1e-9);
    assert!((pace[1] - 150.0).abs() < 1e-9);
    assert!((pace[2] - 300.0).abs() < 1e-9);
}

#[test]
fn test_cap_clips_finite_values_and_leaves_nan_alone() {
    let samples = samples_with_pace(vec![300.0, 500.0, 10_000.0, f64::NAN]);
    let mask = MovingMask::all_moving(4);
    let config = PaceSeriesConfig {
        cap_min_per_km: Some(8.0),
        ..raw_config()
    };
    let pace = build_pace_series(&samples, &mask, &config).unwrap();

    assert!((pace[0] - 300.0).abs() < 1e-9);
    assert!((pace[1] - 480.0).abs() < 1e-9);
    assert!((pace[2] - 480.0).abs() < 1e-9);
    assert!(pace[3].is_nan());
}

#[test]
fn test_real_time_requires_a_usable_pace_channel() {
    let mut samples = samples_with_pace(vec![300.0; 5]);
    samples.pace_s_per_km = None;
    let mask = MovingMask::all_moving(5);

    let err = build_pace_series(&samples, &mask, &raw_config()).unwrap_err();
    assert!(err.is_insufficient_data());

    let samples = samples_with_pace(vec![f64::NAN; 5]);
    let err = build_pace_series(&samples, &mask, &raw_config()).unwrap_err();
    assert!(err.is_insufficient_data());
}

#[test]
fn test_moving_time_mode_ignores_paused_samples() {
    // 2.5 m/s while moving is a 400 s/km pace; the paused stretch carries
    // almost no distance and must not dilate the ratio.
    let mut delta_distance = vec![2.5; 12];
    for v in &mut delta_distance[5..9] {
        *v = 0.1;
    }
    let mut mask_values = vec![true; 12];
    for v in &mut mask_values[5..9] {
        *v = false;
    }
    let samples = ActivitySamples {
        elapsed_time_s: (0..12).map(|i| i as f64).collect(),
        delta_time_s: vec![1.0; 12],
        cumulative_distance_m: vec![0.0; 12],
        delta_distance_m: delta_distance,
        elevation_m: vec![100.0; 12],
        ..ActivitySamples::default()
    };
    let mask = MovingMask::from_values(mask_values);
    let config = PaceSeriesConfig {
        mode: PaceMode::MovingTime,
        ..raw_config()
    };
    let pace = build_pace_series(&samples, &mask, &config).unwrap();

    for (i, v) in pace.iter().enumerate() {
        assert!((v - 400.0).abs() < 1e-9, "sample {i} has pace {v}");
    }
}

#[test]
fn test_moving_time_mode_is_nan_before_any_distance() {
    let mut samples = samples_with_pace(vec![300.0; 5]);
    samples.delta_time_s[0] = 0.0;
    samples.delta_distance_m[0] = 0.0;
    let mask = MovingMask::all_moving(5);
    let config = PaceSeriesConfig {
        mode: PaceMode::MovingTime,
        ..raw_config()
    };
    let pace = build_pace_series(&samples, &mask, &config).unwrap();

    assert!(pace[0].is_nan());
    for v in &pace[1..] {
        assert!(v.is_finite());
    }
}

#[test]
fn test_moving_time_mode_rejects_mismatched_mask() {
    let samples = samples_with_pace(vec![300.0; 5]);
    let mask = MovingMask::all_moving(3);
    let config = PaceSeriesConfig {
        mode: PaceMode::MovingTime,
        ..raw_config()
    };

    let err = build_pace_series(&samples, &mask, &config).unwrap_err();
    assert!(err.is_insufficient_data());
}

#[test]
fn test_default_cap_is_average_pace_with_headroom() {
    // 600 s over 2 km averages 5 min/km, so the cap lands at 7 min/km.
    let samples = ActivitySamples {
        elapsed_time_s: (0..600).map(|i| i as f64).collect(),
        delta_time_s: vec![1.0; 600],
        cumulative_distance_m: (0..600).map(|i| i as f64 * 2000.0 / 599.0).collect(),
        delta_distance_m: vec![2000.0 / 599.0; 600],
        elevation_m: vec![100.0; 600],
        ..ActivitySamples::default()
    };

    let cap = default_pace_cap_min_per_km(&samples);
    assert!((cap - 7.0).abs() < 0.05, "cap was {cap}");
}

#[test]
fn test_default_cap_falls_back_when_totals_are_unusable() {
    let samples = ActivitySamples {
        elapsed_time_s: vec![0.0; 4],
        delta_time_s: vec![f64::NAN; 4],
        cumulative_distance_m: vec![f64::NAN; 4],
        delta_distance_m: vec![f64::NAN; 4],
        elevation_m: vec![100.0; 4],
        ..ActivitySamples::default()
    };

    let cap = default_pace_cap_min_per_km(&samples);
    assert!((cap - 8.0).abs() < 1e-9);
}
