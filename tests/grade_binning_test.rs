// ABOUTME: Unit tests for time-weighted pace-vs-grade binning
// ABOUTME: Covers clamping, pause filtering, weighted statistics, winsorization, and gates
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use pierre_terrain::config::{GradeBinningConfig, MovingMaskConfig};
use pierre_terrain::grade_bins::compute_grade_bins;
use pierre_terrain::moving::{detect_moving_mask, MovingMask};
use pierre_terrain::reference::{ReferenceCurve, ReferencePoint};
use pierre_terrain::samples::ActivitySamples;

fn samples_with_durations(delta_time: Vec<f64>) -> ActivitySamples {
    let n = delta_time.len();
    let mut elapsed = Vec::with_capacity(n);
    let mut t = 0.0;
    for &dt in &delta_time {
        t += dt;
        elapsed.push(t);
    }
    ActivitySamples {
        elapsed_time_s: elapsed,
        delta_time_s: delta_time,
        cumulative_distance_m: vec![0.0; n],
        delta_distance_m: vec![2.5; n],
        elevation_m: vec![100.0; n],
        ..ActivitySamples::default()
    }
}

#[test]
fn test_extreme_grades_are_clamped_into_the_outermost_bins() {
    let samples = samples_with_durations(vec![1.0; 80]);
    let mask = MovingMask::all_moving(80);
    let mut grade = vec![-25.0; 40];
    grade.extend(vec![25.0; 40]);
    let pace = vec![500.0; 80];

    let result = compute_grade_bins(
        &samples,
        &mask,
        &pace,
        &grade,
        None,
        &GradeBinningConfig::default(),
    )
    .unwrap();

    assert_eq!(result.bins.len(), 2);
    assert!((result.bins[0].grade_bin_center + 20.0).abs() < 1e-9);
    assert!((result.bins[1].grade_bin_center - 20.0).abs() < 1e-9);
    for bin in &result.bins {
        assert!((bin.pace_med_s_per_km - 500.0).abs() < 1e-9);
        assert!((bin.time_s_bin - 40.0).abs() < 1e-9);
        assert!((bin.outlier_clip_frac).abs() < 1e-9);
    }
}

#[test]
fn test_paused_samples_are_excluded_from_the_bins() {
    // 20 s of running, a 6 s standstill, then 60 s of walking. The mask
    // flips the standstill plus the first sample after it, leaving 79
    // eligible seconds.
    let mut speed = vec![2.5; 20];
    speed.extend(vec![0.1; 6]);
    speed.extend(vec![1.1; 60]);
    let mut pace = vec![400.0; 20];
    pace.extend(vec![5000.0; 6]);
    pace.extend(vec![900.0; 60]);
    let mut samples = samples_with_durations(vec![1.0; 86]);
    samples.speed_m_s = Some(speed);
    let mask = detect_moving_mask(&samples, &MovingMaskConfig::default());
    let grade = vec![0.0; 86];

    let result = compute_grade_bins(
        &samples,
        &mask,
        &pace,
        &grade,
        None,
        &GradeBinningConfig::default(),
    )
    .unwrap();

    assert_eq!(result.bins.len(), 1);
    let bin = &result.bins[0];
    assert!((bin.grade_bin_center).abs() < 1e-9);
    assert_eq!(bin.pace_n, 79);
    assert!((bin.time_s_bin - 79.0).abs() < 1e-9);
    // More than half the moving time is walking, so the weighted median
    // lands on the walking pace. The paused 5000 s/km rows are gone.
    assert!((bin.pace_med_s_per_km - 900.0).abs() < 1e-9);
}

#[test]
fn test_time_weighting_shifts_median_and_mean() {
    let mut delta_time = vec![10.0; 5];
    delta_time.extend(vec![30.0; 5]);
    let samples = samples_with_durations(delta_time);
    let mask = MovingMask::all_moving(10);
    let mut pace = vec![300.0; 5];
    pace.extend(vec![600.0; 5]);
    let grade = vec![10.0; 10];

    let result = compute_grade_bins(
        &samples,
        &mask,
        &pace,
        &grade,
        None,
        &GradeBinningConfig::default(),
    )
    .unwrap();

    assert_eq!(result.bins.len(), 1);
    let bin = &result.bins[0];
    assert!((bin.pace_med_s_per_km - 600.0).abs() < 1e-9);
    assert!((bin.pace_mean_w_s_per_km - 525.0).abs() < 1e-9);
    assert!((bin.pace_n_eff - 8.0).abs() < 1e-9);
    assert_eq!(bin.pace_n, 10);
    assert!((bin.time_s_bin - 200.0).abs() < 1e-9);
}

#[test]
fn test_single_outlier_is_winsorized_not_reported() {
    // 119 tightly clustered paces and one absurd 5000 s/km row that got
    // past the mask. The winsor bounds pull it back to the cluster edge.
    let mut pace: Vec<f64> = (0..119).map(|i| 405.0 + 30.0 * f64::from(i) / 118.0).collect();
    pace.push(5000.0);
    let mut delta_time = vec![5.0; 119];
    delta_time.push(20.0);
    let samples = samples_with_durations(delta_time);
    let mask = MovingMask::all_moving(120);
    let grade = vec![10.0; 120];

    let result = compute_grade_bins(
        &samples,
        &mask,
        &pace,
        &grade,
        None,
        &GradeBinningConfig::default(),
    )
    .unwrap();

    assert_eq!(result.bins.len(), 1);
    let bin = &result.bins[0];
    assert!(
        bin.outlier_clip_frac > 0.02 && bin.outlier_clip_frac < 0.05,
        "clip fraction was {}",
        bin.outlier_clip_frac
    );
    assert!(
        bin.pace_q75_s_per_km < 500.0,
        "q75 was {}",
        bin.pace_q75_s_per_km
    );
    assert!(bin.pace_med_s_per_km > 410.0 && bin.pace_med_s_per_km < 430.0);
}

#[test]
fn test_sparse_bins_are_not_reported() {
    let samples = samples_with_durations(vec![1.0; 3]);
    let mask = MovingMask::all_moving(3);
    let pace = vec![400.0; 3];
    let grade = vec![0.0; 3];

    let result = compute_grade_bins(
        &samples,
        &mask,
        &pace,
        &grade,
        None,
        &GradeBinningConfig::default(),
    )
    .unwrap();

    assert!(result.bins.is_empty());
    assert!((result.bin_width_grade_pct - 1.0).abs() < 1e-9);
    assert!((result.grade_clamp_pct - 20.0).abs() < 1e-9);
    assert_eq!(result.method, "time_weighted_iqr_winsor");
    assert!(result.reference_curve.is_none());
}

#[test]
fn test_every_eligible_row_lands_in_exactly_one_bin() {
    let config = GradeBinningConfig {
        report_min_time_s: 0.0,
        report_min_n_eff: 0.0,
        ..GradeBinningConfig::default()
    };

    let mut grade = vec![0.0; 50];
    for (i, g) in grade.iter_mut().enumerate().take(30).skip(20) {
        *g = 7.3 + (i as f64) * 0.01;
    }
    for g in &mut grade[10..15] {
        *g = f64::NAN;
    }
    let mut pace = vec![420.0; 50];
    pace[15] = f64::NAN;
    pace[16] = f64::NAN;
    pace[17] = -5.0;
    let mut mask_values = vec![true; 50];
    for v in &mut mask_values[0..10] {
        *v = false;
    }
    let samples = samples_with_durations(vec![1.0; 50]);
    let mask = MovingMask::from_values(mask_values);

    let result = compute_grade_bins(&samples, &mask, &pace, &grade, None, &config).unwrap();

    // 50 rows minus 10 paused, 5 NaN grades, 2 NaN paces, 1 negative pace.
    let total_rows: usize = result.bins.iter().map(|b| b.pace_n).sum();
    assert_eq!(total_rows, 32);

    let centers: Vec<f64> = result.bins.iter().map(|b| b.grade_bin_center).collect();
    assert!(centers.windows(2).all(|w| w[0] < w[1]), "centers not ascending: {centers:?}");

    for bin in &result.bins {
        assert!(bin.outlier_clip_frac >= 0.0 && bin.outlier_clip_frac <= 1.0);
        assert!(bin.pace_n_eff <= bin.pace_n as f64 + 1e-9);
    }
}

#[test]
fn test_reference_curve_is_echoed_in_the_result() {
    let rows = vec![
        ReferencePoint { grade_percent: -5.0, pace_s_per_km: 320.0 },
        ReferencePoint { grade_percent: 0.0, pace_s_per_km: 360.0 },
        ReferencePoint { grade_percent: 5.0, pace_s_per_km: 430.0 },
    ];
    let curve = ReferenceCurve::from_rows(rows).unwrap();
    let samples = samples_with_durations(vec![1.0; 40]);
    let mask = MovingMask::all_moving(40);
    let pace = vec![400.0; 40];
    let grade = vec![0.0; 40];

    let result = compute_grade_bins(
        &samples,
        &mask,
        &pace,
        &grade,
        Some(&curve),
        &GradeBinningConfig::default(),
    )
    .unwrap();

    assert_eq!(result.reference_curve.as_ref().map(ReferenceCurve::len), Some(3));
    assert_eq!(result.bins.len(), 1);
}

#[test]
fn test_mismatched_series_lengths_are_insufficient_data() {
    let samples = samples_with_durations(vec![1.0; 10]);
    let mask = MovingMask::all_moving(10);
    let pace = vec![400.0; 7];
    let grade = vec![0.0; 10];

    let err = compute_grade_bins(
        &samples,
        &mask,
        &pace,
        &grade,
        None,
        &GradeBinningConfig::default(),
    )
    .unwrap_err();
    assert!(err.is_insufficient_data());
}
