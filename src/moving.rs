// ABOUTME: Moving/paused classification of activity samples with debounced pause detection
// ABOUTME: Produces the MovingMask plus pause intervals and moving-time totals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Moving-mask detection.
//!
//! Recording devices keep sampling while the runner waits at a crossing or
//! fumbles with a gel. Those samples would drag every time-weighted pace
//! aggregate toward infinity, so the first step of any analysis is to
//! classify each sample as moving or paused. The mask is derived, stateless
//! data: recompute it whenever the samples change.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::MovingMaskConfig;
use crate::samples::ActivitySamples;
use crate::series;

/// Per-sample moving/paused classification, aligned 1:1 with the activity
/// samples
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovingMask {
    values: Vec<bool>,
}

/// One maximal run of paused samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauseInterval {
    /// First paused sample index (inclusive)
    pub start_idx: usize,
    /// Last paused sample index (inclusive)
    pub end_idx: usize,
    /// Sum of `delta_time_s` over the interval
    pub duration_s: f64,
}

/// Moving-time totals and the pause intervals behind them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingSummary {
    /// Sum of `delta_time_s` over moving samples
    pub moving_time_s: f64,
    /// Sum of `delta_distance_m` over moving samples
    pub moving_distance_m: f64,
    /// Maximal paused runs, in index order
    pub pauses: Vec<PauseInterval>,
}

impl MovingMask {
    /// Mask of `len` samples, all moving
    #[must_use]
    pub fn all_moving(len: usize) -> Self {
        Self {
            values: vec![true; len],
        }
    }

    /// Mask from an explicit per-sample classification
    #[must_use]
    pub const fn from_values(values: Vec<bool>) -> Self {
        Self { values }
    }

    /// Number of classified samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the mask covers no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether sample `index` is moving; out-of-range indices count as
    /// moving
    #[must_use]
    pub fn is_moving(&self, index: usize) -> bool {
        self.values.get(index).copied().unwrap_or(true)
    }

    /// Number of moving samples
    #[must_use]
    pub fn moving_count(&self) -> usize {
        self.values.iter().filter(|&&m| m).count()
    }

    /// The underlying per-sample flags
    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.values
    }

    /// Maximal paused runs with their summed durations
    ///
    /// Zero-duration intervals are still reported; they cover paused
    /// samples even when every covered `delta_time_s` is missing.
    #[must_use]
    pub fn pause_intervals(&self, samples: &ActivitySamples) -> Vec<PauseInterval> {
        let n = self.values.len().min(samples.delta_time_s.len());
        let mut out = Vec::new();
        let mut i = 0;
        while i < n {
            if self.values[i] {
                i += 1;
                continue;
            }
            let start = i;
            let mut duration = 0.0;
            while i < n && !self.values[i] {
                duration += positive_or_zero(samples.delta_time_s[i]);
                i += 1;
            }
            out.push(PauseInterval {
                start_idx: start,
                end_idx: i - 1,
                duration_s: duration,
            });
        }
        out
    }

    /// Moving-time totals plus the pause intervals
    #[must_use]
    pub fn summary(&self, samples: &ActivitySamples) -> MovingSummary {
        let n = self.values.len().min(samples.len());
        let mut moving_time = 0.0;
        let mut moving_distance = 0.0;
        for i in 0..n {
            if self.values[i] {
                moving_time += positive_or_zero(samples.delta_time_s[i]);
                let dd = samples.delta_distance_m[i];
                if dd.is_finite() {
                    moving_distance += dd;
                }
            }
        }
        MovingSummary {
            moving_time_s: moving_time,
            moving_distance_m: moving_distance,
            pauses: self.pause_intervals(samples),
        }
    }
}

/// Classifies every sample as moving or paused
///
/// Speed is median-smoothed and compared against the configured threshold,
/// but only samples that carry duration (`delta_time_s > 0`) participate:
/// duplicate-timestamp rows can neither start nor break a pause. A
/// sub-threshold run flips to paused once its summed duration reaches the
/// debounce minimum, and the flipped range extends through the first
/// time-bearing sample after the run.
///
/// Fails open: without any usable speed signal the whole recording counts
/// as moving.
#[must_use]
pub fn detect_moving_mask(samples: &ActivitySamples, config: &MovingMaskConfig) -> MovingMask {
    let n = samples.len();
    if n == 0 {
        return MovingMask::all_moving(0);
    }

    let Some(speed) = usable_speed(samples) else {
        warn!("no usable speed signal, marking every sample as moving");
        return MovingMask::all_moving(n);
    };
    let filled: Vec<f64> = speed
        .iter()
        .map(|&v| if v.is_finite() { v } else { 0.0 })
        .collect();
    let smoothed = series::rolling_median_centered(&filled, config.speed_median_window_points);

    let dt: Vec<f64> = samples
        .delta_time_s
        .iter()
        .copied()
        .map(positive_or_zero)
        .collect();
    let active: Vec<usize> = (0..n).filter(|&i| dt[i] > 0.0).collect();

    let mut values = vec![true; n];
    let mut pause_runs = 0usize;
    let mut pos = 0;
    while pos < active.len() {
        if smoothed[active[pos]] >= config.speed_threshold_m_s {
            pos += 1;
            continue;
        }
        let run_start = pos;
        while pos < active.len() && smoothed[active[pos]] < config.speed_threshold_m_s {
            pos += 1;
        }
        let run_end = pos - 1;
        let duration: f64 = active[run_start..=run_end].iter().map(|&i| dt[i]).sum();
        if duration >= config.min_pause_duration_s {
            let stop = if run_end + 1 < active.len() {
                active[run_end + 1]
            } else {
                n - 1
            };
            for flag in &mut values[active[run_start]..=stop] {
                *flag = false;
            }
            pause_runs += 1;
        }
    }

    debug!(
        samples = n,
        pauses = pause_runs,
        threshold_m_s = config.speed_threshold_m_s,
        "moving mask built"
    );
    MovingMask { values }
}

fn usable_speed(samples: &ActivitySamples) -> Option<Vec<f64>> {
    if let Some(channel) = &samples.speed_m_s {
        if series::any_finite(channel) {
            return Some(channel.clone());
        }
    }
    let derived = samples.derived_speed_m_s();
    if series::any_finite(&derived) {
        debug!("speed channel unusable, deriving speed from distance/time deltas");
        return Some(derived);
    }
    None
}

fn positive_or_zero(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}
