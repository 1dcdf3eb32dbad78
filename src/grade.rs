// ABOUTME: Per-sample grade series from smoothed elevation and distance deltas
// ABOUTME: Feeds the pace-vs-grade binning engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Sample-domain grade derivation.
//!
//! Climb segmentation measures grade on its own uniform distance grid; this
//! series is the sample-domain counterpart used to assign each sample to a
//! grade bin.

use crate::config::GradeSeriesConfig;
use crate::samples::ActivitySamples;
use crate::series;

/// Grade (%) at each sample from smoothed elevation differences
///
/// Elevation is smoothed with a centered rolling mean before differencing.
/// The grade at a sample is the elevation change from the previous sample
/// over that sample's `delta_distance_m`, as a percentage. Steps shorter
/// than the configured minimum carry no grade: the quotient is numerically
/// meaningless at near-zero step length. The first sample and any
/// non-finite quotient are `NaN`.
#[must_use]
pub fn build_grade_series(samples: &ActivitySamples, config: &GradeSeriesConfig) -> Vec<f64> {
    let n = samples.len();
    if n == 0 {
        return Vec::new();
    }
    let smoothed = if config.smooth_window_points > 1 {
        series::rolling_mean_centered(&samples.elevation_m, config.smooth_window_points)
    } else {
        samples.elevation_m.clone()
    };

    let mut out = Vec::with_capacity(n);
    out.push(f64::NAN);
    for i in 1..n {
        let dd = samples.delta_distance_m[i];
        let keep = config.min_distance_step_m <= 0.0 || dd >= config.min_distance_step_m;
        if !keep {
            out.push(f64::NAN);
            continue;
        }
        let grade = (smoothed[i] - smoothed[i - 1]) / dd * 100.0;
        if grade.is_finite() {
            out.push(grade);
        } else {
            out.push(f64::NAN);
        }
    }
    out
}
