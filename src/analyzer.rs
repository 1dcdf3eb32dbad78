// ABOUTME: Synchronous facade running the full terrain analysis pipeline once
// ABOUTME: Shares mask, pace, and grade series between both engines
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Activity analyzer facade.
//!
//! Every engine needs the moving mask and most need the shared pace
//! series; calling them individually would derive those repeatedly. The
//! analyzer runs the derivations once per activity and feeds both engines.
//! A missing input signal empties the affected output section instead of
//! aborting the whole analysis.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::climbs::{detect_climbs, ClimbSegment};
use crate::config::AnalysisConfig;
use crate::errors::AnalysisResult;
use crate::grade::build_grade_series;
use crate::grade_bins::{compute_grade_bins, GradeBinningResult};
use crate::moving::{detect_moving_mask, MovingSummary};
use crate::pace::{build_pace_series, default_pace_cap_min_per_km};
use crate::reference::ReferenceCurve;
use crate::samples::ActivitySamples;

/// Complete analysis of one activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityAnalysis {
    /// Moving-time totals and pause intervals
    pub moving: MovingSummary,
    /// Qualifying climbs, best first
    pub climbs: Vec<ClimbSegment>,
    /// Pace-vs-grade bin table
    pub grade_bins: GradeBinningResult,
}

/// Runs the terrain analysis pipeline with a fixed configuration
#[derive(Debug, Clone)]
pub struct ActivityAnalyzer {
    config: AnalysisConfig,
}

impl ActivityAnalyzer {
    /// Analyzer with a validated custom configuration
    ///
    /// # Errors
    /// Returns [`crate::errors::AnalysisError::InvalidConfiguration`] when
    /// the configuration fails validation.
    pub fn new(config: AnalysisConfig) -> AnalysisResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Analyzer with the default configuration
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            config: AnalysisConfig::default(),
        }
    }

    /// The configuration this analyzer runs with
    #[must_use]
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyzes one activity
    ///
    /// The mask, pace series, and grade series are derived once and shared.
    /// When the pace series cannot be built the climbs lose their pace
    /// field and the bin table comes back empty; when climb detection lacks
    /// its inputs the climb list comes back empty. `reference` is attached
    /// to the bin result untouched.
    ///
    /// # Errors
    /// Returns [`crate::errors::AnalysisError::InsufficientData`] when the
    /// sample channels disagree in length.
    pub fn analyze(
        &self,
        samples: &ActivitySamples,
        reference: Option<&ReferenceCurve>,
    ) -> AnalysisResult<ActivityAnalysis> {
        samples.validate()?;

        let mask = detect_moving_mask(samples, &self.config.moving);
        let mut pace_config = self.config.pace.clone();
        if pace_config.cap_min_per_km.is_none() {
            pace_config.cap_min_per_km = Some(default_pace_cap_min_per_km(samples));
        }
        let pace = match build_pace_series(samples, &mask, &pace_config) {
            Ok(series) => Some(series),
            Err(e) if e.is_insufficient_data() => {
                debug!(error = %e, "pace series unavailable");
                None
            }
            Err(e) => return Err(e),
        };
        let grade = build_grade_series(samples, &self.config.grade);

        let climbs = match detect_climbs(samples, &mask, pace.as_deref(), &self.config.climbs) {
            Ok(climbs) => climbs,
            Err(e) if e.is_insufficient_data() => {
                debug!(error = %e, "climb section omitted");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let grade_bins = if let Some(pace) = &pace {
            match compute_grade_bins(
                samples,
                &mask,
                pace,
                &grade,
                reference,
                &self.config.grade_bins,
            ) {
                Ok(result) => result,
                Err(e) if e.is_insufficient_data() => {
                    debug!(error = %e, "grade bin section empty");
                    GradeBinningResult::empty(&self.config.grade_bins, reference)
                }
                Err(e) => return Err(e),
            }
        } else {
            GradeBinningResult::empty(&self.config.grade_bins, reference)
        };

        debug!(
            climbs = climbs.len(),
            bins = grade_bins.bins.len(),
            "activity analysis complete"
        );
        Ok(ActivityAnalysis {
            moving: mask.summary(samples),
            climbs,
            grade_bins,
        })
    }
}

impl Default for ActivityAnalyzer {
    fn default() -> Self {
        Self::with_defaults()
    }
}
