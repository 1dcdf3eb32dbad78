// ABOUTME: Main library entry point for the Pierre terrain analytics core
// ABOUTME: Derived-series pipeline plus climb segmentation and pace-vs-grade binning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Terrain
//!
//! Terrain-aware analytics over a single running activity's raw samples.
//! The crate takes the parsed time/distance/elevation channels of one
//! activity and produces structured metrics; parsing, transport, caching,
//! and presentation live in the surrounding services.
//!
//! ## Components
//!
//! - **Moving mask**: classifies each sample as moving or paused, with
//!   debounced pause detection
//! - **Pace series**: the smoothed, capped pace every other component
//!   shares
//! - **Grade series**: per-sample grade from smoothed elevation
//! - **Climb segmentation**: sustained-ascent detection on a uniform
//!   distance grid with hysteresis
//! - **Grade binning**: robust time-weighted pace-vs-grade statistics
//! - **Analyzer facade**: runs the shared pipeline once and feeds both
//!   engines
//!
//! ## Example Usage
//!
//! ```rust
//! use pierre_terrain::analyzer::ActivityAnalyzer;
//! use pierre_terrain::samples::ActivitySamples;
//!
//! let samples = ActivitySamples {
//!     elapsed_time_s: vec![0.0, 1.0, 2.0],
//!     delta_time_s: vec![0.0, 1.0, 1.0],
//!     cumulative_distance_m: vec![0.0, 3.0, 6.0],
//!     delta_distance_m: vec![0.0, 3.0, 3.0],
//!     elevation_m: vec![100.0, 100.1, 100.2],
//!     ..ActivitySamples::default()
//! };
//!
//! let analysis = ActivityAnalyzer::with_defaults().analyze(&samples, None)?;
//! assert!(analysis.climbs.is_empty());
//! # Ok::<(), pierre_terrain::errors::AnalysisError>(())
//! ```

/// Synchronous facade running the full pipeline once per activity
pub mod analyzer;

/// Climb segmentation over a uniform distance grid
pub mod climbs;

/// Tunable configuration with environment overrides and validation
pub mod config;

/// Default thresholds, window sizes, and gates
pub mod constants;

/// Crate-wide error type and result alias
pub mod errors;

/// Per-sample grade series derivation
pub mod grade;

/// Robust time-weighted pace-vs-grade binning
pub mod grade_bins;

/// Moving/paused classification and pause intervals
pub mod moving;

/// Shared pace-series construction
pub mod pace;

/// Reference pace-vs-grade curve from configuration data
pub mod reference;

/// Fixed-schema sample channels for one activity
pub mod samples;

/// Windowed-pass statistics over `f64` slices
pub mod series;
