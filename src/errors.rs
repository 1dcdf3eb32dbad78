// ABOUTME: Error taxonomy for the terrain analysis core
// ABOUTME: Distinguishes recoverable data gaps from configuration mistakes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Crate-wide error types.
//!
//! Two outcomes are deliberately NOT errors: an activity with no qualifying
//! climbs and a binning pass that retains zero bins. Those are ordinary
//! results returned as empty collections. Errors are reserved for inputs
//! the pipeline cannot work with at all (a required channel that is missing
//! or entirely non-finite) and for invalid configuration.

use thiserror::Error;

/// Result alias used across the crate
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors surfaced by the analysis components
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A required input channel is missing, misaligned, or entirely
    /// non-finite. Signaled, not fatal: callers typically omit the
    /// corresponding output section and keep the rest of the analysis.
    #[error("insufficient data: {reason}")]
    InsufficientData {
        /// What was missing and for which computation
        reason: String,
    },

    /// A configuration value is out of range or inconsistent with another
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfiguration {
        /// The offending configuration field or environment variable
        field: String,
        /// Why the value was rejected
        reason: String,
    },

    /// The reference pace curve could not be built from the supplied rows
    #[error("reference curve rejected: {reason}")]
    ReferenceCurve {
        /// Why the control points were rejected
        reason: String,
    },

    /// The reference pace curve YAML could not be parsed
    #[error("reference curve YAML is malformed")]
    ReferenceCurveFormat(#[from] serde_yaml::Error),
}

impl AnalysisError {
    /// Shorthand for [`AnalysisError::InsufficientData`]
    #[must_use]
    pub fn insufficient(reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`AnalysisError::InvalidConfiguration`]
    #[must_use]
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for data gaps the caller can downgrade to an omitted section
    #[must_use]
    pub const fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}
