// ABOUTME: Reference pace-vs-grade curve from configuration data
// ABOUTME: Validated control points with clamped piecewise-linear evaluation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Reference pace curve.
//!
//! A small table of (grade %, pace s/km) control points supplied as
//! configuration data, typically from a YAML file. The binning engine
//! attaches it untouched to its result so chart layers can draw an expected
//! curve next to the measured one; it is never recomputed from activity
//! data.

use serde::{Deserialize, Serialize};

use crate::errors::{AnalysisError, AnalysisResult};

/// One control point of the reference curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    /// Grade in percent
    pub grade_percent: f64,
    /// Expected pace at that grade, in s/km
    pub pace_s_per_km: f64,
}

/// Piecewise-linear pace-vs-grade curve, strictly increasing in grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCurve {
    points: Vec<ReferencePoint>,
    /// Provenance label, e.g. the file the table was loaded from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl ReferenceCurve {
    /// Builds a curve from raw control points
    ///
    /// Rows with a non-finite grade or pace are dropped, the remainder is
    /// sorted by grade, and duplicate grades collapse to the last row
    /// given.
    ///
    /// # Errors
    /// Returns [`AnalysisError::ReferenceCurve`] when fewer than two usable
    /// control points remain.
    pub fn from_rows(rows: Vec<ReferencePoint>) -> AnalysisResult<Self> {
        let mut usable: Vec<ReferencePoint> = rows
            .into_iter()
            .filter(|p| p.grade_percent.is_finite() && p.pace_s_per_km.is_finite())
            .collect();
        // Stable sort: rows sharing a grade keep their input order, so the
        // dedup below keeps the last one given.
        usable.sort_by(|a, b| a.grade_percent.total_cmp(&b.grade_percent));
        let mut points: Vec<ReferencePoint> = Vec::with_capacity(usable.len());
        for p in usable {
            match points.last_mut() {
                Some(last) if last.grade_percent.total_cmp(&p.grade_percent).is_eq() => {
                    *last = p;
                }
                _ => points.push(p),
            }
        }
        if points.len() < 2 {
            return Err(AnalysisError::ReferenceCurve {
                reason: format!(
                    "{} usable control points, need at least 2",
                    points.len()
                ),
            });
        }
        Ok(Self {
            points,
            source: None,
        })
    }

    /// Parses a YAML list of control points and builds a curve from it
    ///
    /// # Errors
    /// Returns [`AnalysisError::ReferenceCurveFormat`] on malformed YAML
    /// and [`AnalysisError::ReferenceCurve`] when fewer than two usable
    /// control points remain.
    pub fn from_yaml_str(yaml: &str) -> AnalysisResult<Self> {
        let rows: Vec<ReferencePoint> = serde_yaml::from_str(yaml)?;
        Self::from_rows(rows)
    }

    /// Attaches a provenance label
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Expected pace at `grade_percent`, clamped to the end points outside
    /// the table; `NaN` for a non-finite grade
    #[must_use]
    pub fn pace_at(&self, grade_percent: f64) -> f64 {
        if !grade_percent.is_finite() {
            return f64::NAN;
        }
        let hi = self
            .points
            .partition_point(|p| p.grade_percent < grade_percent);
        if hi == 0 {
            return self.points[0].pace_s_per_km;
        }
        if hi == self.points.len() {
            return self.points[self.points.len() - 1].pace_s_per_km;
        }
        let (a, b) = (self.points[hi - 1], self.points[hi]);
        let t = (grade_percent - a.grade_percent) / (b.grade_percent - a.grade_percent);
        t.mul_add(b.pace_s_per_km - a.pace_s_per_km, a.pace_s_per_km)
    }

    /// The validated control points, ascending in grade
    #[must_use]
    pub fn points(&self) -> &[ReferencePoint] {
        &self.points
    }

    /// Number of control points (always at least 2)
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: construction requires at least two points
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The provenance label, when one was attached
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}
