// ABOUTME: Tunable configuration for the terrain analysis pipeline with environment overrides
// ABOUTME: Nested per-component sections, serde round-tripping and range validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Analysis configuration.
//!
//! Every tunable of the pipeline lives here, grouped per component and
//! seeded from [`crate::constants`]. Deployments override individual
//! values through `TERRAIN_`-prefixed environment variables; anything not
//! overridden keeps its default. [`AnalysisConfig::validate`] rejects
//! configurations the engines cannot run with.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{binning, climb, grade, moving, pace};
use crate::errors::{AnalysisError, AnalysisResult};
use crate::pace::PaceMode;

/// Moving-mask detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovingMaskConfig {
    /// Smoothed speed below this many m/s counts as stationary
    pub speed_threshold_m_s: f64,
    /// Slow stretches shorter than this many seconds stay "moving"
    pub min_pause_duration_s: f64,
    /// Centered median window applied to speed before thresholding
    pub speed_median_window_points: usize,
}

impl Default for MovingMaskConfig {
    fn default() -> Self {
        Self {
            speed_threshold_m_s: moving::SPEED_THRESHOLD_M_S,
            min_pause_duration_s: moving::MIN_PAUSE_DURATION_S,
            speed_median_window_points: moving::SPEED_MEDIAN_WINDOW_POINTS,
        }
    }
}

impl MovingMaskConfig {
    /// Checks that the mask settings are usable
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidConfiguration`] on the first field
    /// outside its accepted range.
    pub fn validate(&self) -> AnalysisResult<()> {
        if !self.speed_threshold_m_s.is_finite() || self.speed_threshold_m_s < 0.0 {
            return Err(AnalysisError::invalid_config(
                "moving.speed_threshold_m_s",
                "must be finite and non-negative",
            ));
        }
        if !self.min_pause_duration_s.is_finite() || self.min_pause_duration_s < 0.0 {
            return Err(AnalysisError::invalid_config(
                "moving.min_pause_duration_s",
                "must be finite and non-negative",
            ));
        }
        if self.speed_median_window_points == 0 {
            return Err(AnalysisError::invalid_config(
                "moving.speed_median_window_points",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Pace-series construction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaceSeriesConfig {
    /// Whether pauses dilate the pace or are excluded from it
    pub mode: PaceMode,
    /// Extra points in the centered smoothing window; 0 disables smoothing
    pub smoothing_points: usize,
    /// Ceiling in min/km applied after smoothing; `None` leaves pace uncapped
    pub cap_min_per_km: Option<f64>,
}

impl Default for PaceSeriesConfig {
    fn default() -> Self {
        Self {
            mode: PaceMode::default(),
            smoothing_points: pace::SMOOTHING_POINTS,
            cap_min_per_km: None,
        }
    }
}

impl PaceSeriesConfig {
    /// Checks that the pace settings are usable
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidConfiguration`] when the cap is set
    /// but not a positive finite number.
    pub fn validate(&self) -> AnalysisResult<()> {
        if let Some(cap) = self.cap_min_per_km {
            if !cap.is_finite() || cap <= 0.0 {
                return Err(AnalysisError::invalid_config(
                    "pace.cap_min_per_km",
                    "must be finite and positive when set",
                ));
            }
        }
        Ok(())
    }
}

/// Sample-level grade derivation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeSeriesConfig {
    /// Centered mean window applied to elevation before differencing
    pub smooth_window_points: usize,
    /// Steps shorter than this many meters get no grade
    pub min_distance_step_m: f64,
}

impl Default for GradeSeriesConfig {
    fn default() -> Self {
        Self {
            smooth_window_points: grade::SMOOTH_WINDOW_POINTS,
            min_distance_step_m: grade::MIN_DISTANCE_STEP_M,
        }
    }
}

impl GradeSeriesConfig {
    /// Checks that the grade settings are usable
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidConfiguration`] on the first field
    /// outside its accepted range.
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.smooth_window_points == 0 {
            return Err(AnalysisError::invalid_config(
                "grade.smooth_window_points",
                "must be at least 1",
            ));
        }
        if !self.min_distance_step_m.is_finite() || self.min_distance_step_m < 0.0 {
            return Err(AnalysisError::invalid_config(
                "grade.min_distance_step_m",
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// Climb segmentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimbConfig {
    /// Spacing of the uniform distance grid in meters
    pub grid_step_m: f64,
    /// Lag distance over which grid grade is measured, in meters
    pub grade_window_m: f64,
    /// Centered mean window over gridded elevation, in meters
    pub elevation_smooth_window_m: f64,
    /// Grade that arms a climb start, in percent
    pub start_grade_percent: f64,
    /// Grade that keeps a climb alive without consuming gap budget
    pub continue_grade_percent: f64,
    /// Grade above which a soft gap still refreshes the climb endpoint
    pub gap_grade_percent: f64,
    /// Gap budget in meters before a climb is closed
    pub gap_max_distance_m: f64,
    /// Gap budget in seconds before a climb is closed
    pub gap_max_time_s: f64,
    /// Grade at or below which grid points count as descent
    pub descent_grade_percent: f64,
    /// Sustained descent distance that terminates a climb, in meters
    pub descent_distance_m: f64,
    /// Steep running distance required to confirm a start, in meters
    pub start_confirm_distance_m: f64,
    /// Minimum elevation gain for a reported climb, in meters
    pub min_gain_m: f64,
    /// Minimum moving time for a reported climb, in seconds
    pub min_duration_s: f64,
    /// Minimum distance for a reported climb, in meters
    pub min_distance_m: f64,
}

impl Default for ClimbConfig {
    fn default() -> Self {
        Self {
            grid_step_m: climb::GRID_STEP_M,
            grade_window_m: climb::GRADE_WINDOW_M,
            elevation_smooth_window_m: climb::ELEVATION_SMOOTH_WINDOW_M,
            start_grade_percent: climb::START_GRADE_PCT,
            continue_grade_percent: climb::CONTINUE_GRADE_PCT,
            gap_grade_percent: climb::GAP_GRADE_PCT,
            gap_max_distance_m: climb::GAP_MAX_DISTANCE_M,
            gap_max_time_s: climb::GAP_MAX_TIME_S,
            descent_grade_percent: climb::DESCENT_GRADE_PCT,
            descent_distance_m: climb::DESCENT_DISTANCE_M,
            start_confirm_distance_m: climb::START_CONFIRM_DISTANCE_M,
            min_gain_m: climb::MIN_GAIN_M,
            min_duration_s: climb::MIN_DURATION_S,
            min_distance_m: climb::MIN_DISTANCE_M,
        }
    }
}

impl ClimbConfig {
    /// Checks that the climb settings are usable
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidConfiguration`] on the first field
    /// outside its accepted range, including a grade-threshold ordering
    /// that would make the state machine unreachable.
    pub fn validate(&self) -> AnalysisResult<()> {
        self.validate_geometry()?;
        self.validate_thresholds()
    }

    fn validate_geometry(&self) -> AnalysisResult<()> {
        for (name, value) in [
            ("climbs.grid_step_m", self.grid_step_m),
            ("climbs.grade_window_m", self.grade_window_m),
            (
                "climbs.elevation_smooth_window_m",
                self.elevation_smooth_window_m,
            ),
            ("climbs.gap_max_distance_m", self.gap_max_distance_m),
            ("climbs.gap_max_time_s", self.gap_max_time_s),
            ("climbs.descent_distance_m", self.descent_distance_m),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalysisError::invalid_config(
                    name,
                    "must be finite and positive",
                ));
            }
        }
        for (name, value) in [
            ("climbs.start_confirm_distance_m", self.start_confirm_distance_m),
            ("climbs.min_gain_m", self.min_gain_m),
            ("climbs.min_duration_s", self.min_duration_s),
            ("climbs.min_distance_m", self.min_distance_m),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalysisError::invalid_config(
                    name,
                    "must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }

    fn validate_thresholds(&self) -> AnalysisResult<()> {
        for (name, value) in [
            ("climbs.start_grade_percent", self.start_grade_percent),
            ("climbs.continue_grade_percent", self.continue_grade_percent),
            ("climbs.gap_grade_percent", self.gap_grade_percent),
            ("climbs.descent_grade_percent", self.descent_grade_percent),
        ] {
            if !value.is_finite() {
                return Err(AnalysisError::invalid_config(name, "must be finite"));
            }
        }
        if self.start_grade_percent < self.continue_grade_percent
            || self.continue_grade_percent < self.gap_grade_percent
        {
            return Err(AnalysisError::invalid_config(
                "climbs.start_grade_percent",
                "grade thresholds must satisfy start >= continue >= gap",
            ));
        }
        if self.descent_grade_percent > 0.0 {
            return Err(AnalysisError::invalid_config(
                "climbs.descent_grade_percent",
                "must be zero or negative",
            ));
        }
        Ok(())
    }
}

/// Pace-vs-grade binning settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeBinningConfig {
    /// Grades are clamped into `[-clamp, +clamp]` percent before binning
    pub grade_clamp_percent: f64,
    /// Width of each grade bin in percent
    pub bin_width_percent: f64,
    /// Minimum accumulated time for a bin to be reported, in seconds
    pub report_min_time_s: f64,
    /// Minimum effective sample size for a bin to be reported
    pub report_min_n_eff: f64,
    /// Minimum accumulated time before winsorizing kicks in, in seconds
    pub winsor_min_time_s: f64,
    /// Minimum effective sample size before winsorizing kicks in
    pub winsor_min_n_eff: f64,
    /// IQR multiplier for the primary winsorizing bounds
    pub winsor_k_iqr: f64,
    /// Sigma multiplier for the MAD fallback bounds
    pub winsor_k_mad_sigma: f64,
}

impl Default for GradeBinningConfig {
    fn default() -> Self {
        Self {
            grade_clamp_percent: binning::GRADE_CLAMP_PCT,
            bin_width_percent: binning::BIN_WIDTH_PCT,
            report_min_time_s: binning::REPORT_MIN_TIME_S,
            report_min_n_eff: binning::REPORT_MIN_N_EFF,
            winsor_min_time_s: binning::WINSOR_MIN_TIME_S,
            winsor_min_n_eff: binning::WINSOR_MIN_N_EFF,
            winsor_k_iqr: binning::WINSOR_K_IQR,
            winsor_k_mad_sigma: binning::WINSOR_K_MAD_SIGMA,
        }
    }
}

impl GradeBinningConfig {
    /// Checks that the binning settings are usable
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidConfiguration`] on the first field
    /// outside its accepted range, including winsor gates below the report
    /// gates.
    pub fn validate(&self) -> AnalysisResult<()> {
        for (name, value) in [
            ("grade_bins.grade_clamp_percent", self.grade_clamp_percent),
            ("grade_bins.bin_width_percent", self.bin_width_percent),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalysisError::invalid_config(
                    name,
                    "must be finite and positive",
                ));
            }
        }
        for (name, value) in [
            ("grade_bins.report_min_time_s", self.report_min_time_s),
            ("grade_bins.report_min_n_eff", self.report_min_n_eff),
            ("grade_bins.winsor_min_time_s", self.winsor_min_time_s),
            ("grade_bins.winsor_min_n_eff", self.winsor_min_n_eff),
            ("grade_bins.winsor_k_iqr", self.winsor_k_iqr),
            ("grade_bins.winsor_k_mad_sigma", self.winsor_k_mad_sigma),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalysisError::invalid_config(
                    name,
                    "must be finite and non-negative",
                ));
            }
        }
        if self.winsor_min_time_s < self.report_min_time_s
            || self.winsor_min_n_eff < self.report_min_n_eff
        {
            return Err(AnalysisError::invalid_config(
                "grade_bins.winsor_min_time_s",
                "winsor gates must not be below the report gates",
            ));
        }
        Ok(())
    }
}

/// Complete analysis configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Moving-mask detection
    pub moving: MovingMaskConfig,
    /// Pace-series construction
    pub pace: PaceSeriesConfig,
    /// Sample-level grade derivation
    pub grade: GradeSeriesConfig,
    /// Climb segmentation
    pub climbs: ClimbConfig,
    /// Pace-vs-grade binning
    pub grade_bins: GradeBinningConfig,
}

impl AnalysisConfig {
    /// Builds a configuration from defaults plus `TERRAIN_`-prefixed
    /// environment overrides
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidConfiguration`] when an override
    /// cannot be parsed or the resulting configuration fails validation.
    pub fn from_environment() -> AnalysisResult<Self> {
        let mut config = Self::default();
        if let Some(v) = parse_env("TERRAIN_PAUSE_SPEED_THRESHOLD_M_S")? {
            config.moving.speed_threshold_m_s = v;
        }
        if let Some(v) = parse_env("TERRAIN_MIN_PAUSE_DURATION_S")? {
            config.moving.min_pause_duration_s = v;
        }
        if let Some(v) = parse_env("TERRAIN_PACE_SMOOTHING_POINTS")? {
            config.pace.smoothing_points = v;
        }
        if let Some(v) = parse_env("TERRAIN_PACE_CAP_MIN_PER_KM")? {
            config.pace.cap_min_per_km = Some(v);
        }
        if let Some(v) = parse_env("TERRAIN_CLIMB_GRID_STEP_M")? {
            config.climbs.grid_step_m = v;
        }
        if let Some(v) = parse_env("TERRAIN_CLIMB_START_GRADE_PCT")? {
            config.climbs.start_grade_percent = v;
        }
        if let Some(v) = parse_env("TERRAIN_CLIMB_MIN_DISTANCE_M")? {
            config.climbs.min_distance_m = v;
        }
        if let Some(v) = parse_env("TERRAIN_BIN_WIDTH_PCT")? {
            config.grade_bins.bin_width_percent = v;
        }
        if let Some(v) = parse_env("TERRAIN_BIN_REPORT_MIN_TIME_S")? {
            config.grade_bins.report_min_time_s = v;
        }
        config.validate()?;
        Ok(config)
    }

    /// Checks every section of the configuration
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidConfiguration`] from the first
    /// section that rejects its settings.
    pub fn validate(&self) -> AnalysisResult<()> {
        self.moving.validate()?;
        self.pace.validate()?;
        self.grade.validate()?;
        self.climbs.validate()?;
        self.grade_bins.validate()
    }
}

fn parse_env<T: FromStr>(name: &str) -> AnalysisResult<Option<T>> {
    let Ok(raw) = env::var(name) else {
        return Ok(None);
    };
    raw.parse().map(Some).map_err(|_| {
        AnalysisError::invalid_config(name, format!("cannot parse value {raw:?}"))
    })
}
