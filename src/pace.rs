// ABOUTME: Builds the smoothed, capped pace series every downstream consumer shares
// ABOUTME: Supports raw instantaneous pace and pause-free moving-time pace
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Pace-series construction.
//!
//! Climb metrics and grade bins both read pace from one shared series built
//! here, so a smoothing or capping change lands everywhere at once. Paused
//! samples still receive a value; consumers exclude them through the
//! [`MovingMask`], not in this module.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PaceSeriesConfig;
use crate::constants::pace;
use crate::errors::{AnalysisError, AnalysisResult};
use crate::moving::MovingMask;
use crate::samples::ActivitySamples;
use crate::series;

/// How paused intervals enter the pace computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceMode {
    /// Raw instantaneous pace; pauses dilate the values around them
    #[default]
    RealTime,
    /// Cumulative moving time over cumulative moving distance; pauses are
    /// excluded before the quotient
    MovingTime,
}

/// Builds the per-sample pace series (s/km)
///
/// The raw series is smoothed with a centered rolling mean
/// (`smoothing_points` extra points, boundary-truncated) in which
/// non-finite samples are excluded from numerator and denominator alike.
/// Finite values above the configured cap are clipped to it; `NaN` values
/// pass through untouched.
///
/// # Errors
/// Returns [`AnalysisError::InsufficientData`] in `real_time` mode when the
/// pace channel is absent or entirely non-finite, and in `moving_time` mode
/// when the mask length disagrees with the sample count.
pub fn build_pace_series(
    samples: &ActivitySamples,
    mask: &MovingMask,
    config: &PaceSeriesConfig,
) -> AnalysisResult<Vec<f64>> {
    let n = samples.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut values = match config.mode {
        PaceMode::RealTime => real_time_pace(samples)?,
        PaceMode::MovingTime => moving_time_pace(samples, mask)?,
    };

    if config.smoothing_points > 0 {
        values = series::rolling_mean_centered(&values, config.smoothing_points + 1);
    }
    if let Some(cap_min) = config.cap_min_per_km {
        let cap_s = cap_min * 60.0;
        for v in &mut values {
            if v.is_finite() && *v > cap_s {
                *v = cap_s;
            }
        }
    }

    debug!(
        mode = ?config.mode,
        smoothing_points = config.smoothing_points,
        "pace series built"
    );
    Ok(values)
}

fn real_time_pace(samples: &ActivitySamples) -> AnalysisResult<Vec<f64>> {
    let channel = samples
        .pace_s_per_km
        .as_ref()
        .filter(|c| series::any_finite(c))
        .ok_or_else(|| {
            AnalysisError::insufficient("pace channel absent or entirely non-finite")
        })?;
    Ok(channel.clone())
}

fn moving_time_pace(samples: &ActivitySamples, mask: &MovingMask) -> AnalysisResult<Vec<f64>> {
    let n = samples.len();
    if mask.len() != n {
        return Err(AnalysisError::insufficient(format!(
            "moving mask covers {} samples, expected {n}",
            mask.len()
        )));
    }
    let mut out = Vec::with_capacity(n);
    let mut cum_time = 0.0;
    let mut cum_km = 0.0;
    for i in 0..n {
        if mask.is_moving(i) {
            let dt = samples.delta_time_s[i];
            let dd = samples.delta_distance_m[i];
            if dt.is_finite() {
                cum_time += dt;
            }
            if dd.is_finite() {
                cum_km += dd / 1000.0;
            }
        }
        if cum_km.abs() > 0.0 {
            out.push(cum_time / cum_km);
        } else {
            out.push(f64::NAN);
        }
    }
    Ok(out)
}

/// Default pace cap: 1.4x the activity's average pace, in min/km
///
/// Falls back to 8.0 min/km when the activity has no usable total time or
/// distance to average over.
#[must_use]
pub fn default_pace_cap_min_per_km(samples: &ActivitySamples) -> f64 {
    let total_time_s: f64 = samples
        .delta_time_s
        .iter()
        .filter(|v| v.is_finite() && **v > 0.0)
        .sum();
    let total_km = samples
        .cumulative_distance_m
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max)
        / 1000.0;
    if total_time_s > 0.0 && total_km > 0.0 {
        let avg_min_per_km = total_time_s / total_km / 60.0;
        let cap = avg_min_per_km * pace::DEFAULT_CAP_FACTOR;
        if cap.is_finite() && cap > 0.0 {
            return cap;
        }
    }
    pace::FALLBACK_CAP_MIN_PER_KM
}
