// ABOUTME: Fixed-schema struct-of-arrays model for one activity's raw samples
// ABOUTME: Owned by the external loader; the analysis core only reads it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Per-activity sample channels.
//!
//! An activity is a bounded, time-ordered sequence of samples already
//! parsed from GPX/FIT by an external loader. Channels are parallel
//! `Vec<f64>` arrays of one common length; gaps inside a channel are
//! encoded as `f64::NAN`, and channels the recording device never produced
//! are `None`.

use serde::{Deserialize, Serialize};

use crate::errors::{AnalysisError, AnalysisResult};

/// Raw sample channels for a single activity
///
/// Required channels cover time, distance, and elevation. Speed, pace, and
/// heart rate are optional: not every device records them, and speed can be
/// derived from the distance/time deltas when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivitySamples {
    /// Seconds since the start of the recording
    pub elapsed_time_s: Vec<f64>,
    /// Seconds since the previous sample (0 for duplicate timestamps)
    pub delta_time_s: Vec<f64>,
    /// Cumulative distance from the start (m)
    pub cumulative_distance_m: Vec<f64>,
    /// Distance covered since the previous sample (m)
    pub delta_distance_m: Vec<f64>,
    /// Elevation (m)
    pub elevation_m: Vec<f64>,
    /// Instantaneous speed (m/s), when the device recorded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_m_s: Option<Vec<f64>>,
    /// Instantaneous pace (s/km), when the device recorded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace_s_per_km: Option<Vec<f64>>,
    /// Heart rate (bpm), when the device recorded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate_bpm: Option<Vec<f64>>,
}

impl ActivitySamples {
    /// Number of samples in the activity
    #[must_use]
    pub fn len(&self) -> usize {
        self.elapsed_time_s.len()
    }

    /// True when the activity has no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elapsed_time_s.is_empty()
    }

    /// Check that every present channel has the same length
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InsufficientData`] naming the first channel
    /// whose length disagrees with `elapsed_time_s`.
    pub fn validate(&self) -> AnalysisResult<()> {
        let n = self.len();
        let required = [
            ("delta_time_s", self.delta_time_s.len()),
            ("cumulative_distance_m", self.cumulative_distance_m.len()),
            ("delta_distance_m", self.delta_distance_m.len()),
            ("elevation_m", self.elevation_m.len()),
        ];
        for (name, len) in required {
            if len != n {
                return Err(AnalysisError::insufficient(format!(
                    "channel {name} has {len} samples, expected {n}"
                )));
            }
        }
        let optional = [
            ("speed_m_s", self.speed_m_s.as_ref().map(Vec::len)),
            ("pace_s_per_km", self.pace_s_per_km.as_ref().map(Vec::len)),
            ("heart_rate_bpm", self.heart_rate_bpm.as_ref().map(Vec::len)),
        ];
        for (name, len) in optional {
            if let Some(len) = len {
                if len != n {
                    return Err(AnalysisError::insufficient(format!(
                        "channel {name} has {len} samples, expected {n}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Speed derived from the distance/time deltas (m/s)
    ///
    /// NaN wherever the deltas do not support a quotient (missing values or
    /// a non-positive time step).
    #[must_use]
    pub fn derived_speed_m_s(&self) -> Vec<f64> {
        self.delta_distance_m
            .iter()
            .zip(&self.delta_time_s)
            .map(|(&dd, &dt)| {
                if dd.is_finite() && dt.is_finite() && dt > 0.0 {
                    dd / dt
                } else {
                    f64::NAN
                }
            })
            .collect()
    }
}
