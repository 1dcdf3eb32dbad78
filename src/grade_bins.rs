// ABOUTME: Robust time-weighted pace-vs-grade binning with IQR/MAD winsorization
// ABOUTME: Produces the GradeBin table and its result envelope
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Pace-vs-grade binning.
//!
//! Groups moving samples into fixed-width grade bins and aggregates pace
//! per bin, weighted by each sample's duration so slow samples do not
//! dominate by count. Well-supported bins are winsorized against outliers
//! before aggregation; sparse bins are dropped rather than reported with
//! unstable statistics.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GradeBinningConfig;
use crate::constants::binning;
use crate::errors::{AnalysisError, AnalysisResult};
use crate::moving::MovingMask;
use crate::reference::ReferenceCurve;
use crate::samples::ActivitySamples;
use crate::series;

const METHOD: &str = "time_weighted_iqr_winsor";

/// Aggregated pace statistics for one grade bin
///
/// The bin covers `(center - width/2, center + width/2]`, width echoed by
/// the enclosing [`GradeBinningResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBin {
    /// Center of the bin's grade interval, in percent
    pub grade_bin_center: f64,
    /// Weighted median pace, in s/km
    pub pace_med_s_per_km: f64,
    /// Weighted mean pace, in s/km
    pub pace_mean_w_s_per_km: f64,
    /// Unweighted sample standard deviation of pace; 0.0 below two samples
    pub pace_std_s_per_km: f64,
    /// Weighted standard deviation of pace, in s/km
    pub pace_std_w_s_per_km: f64,
    /// Weighted first-quartile pace, in s/km
    pub pace_q25_s_per_km: f64,
    /// Weighted third-quartile pace, in s/km
    pub pace_q75_s_per_km: f64,
    /// Number of samples aggregated into the bin
    pub pace_n: usize,
    /// Kish effective sample size; at most `pace_n`
    pub pace_n_eff: f64,
    /// Total duration the bin represents, in seconds
    pub time_s_bin: f64,
    /// Fraction of bin weight that lay outside the winsorizing bounds
    pub outlier_clip_frac: f64,
}

/// Retained grade bins plus the metadata needed to interpret them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBinningResult {
    /// Reported bins, ascending by grade center
    pub bins: Vec<GradeBin>,
    /// Width of each bin's grade interval, in percent
    pub bin_width_grade_pct: f64,
    /// Grades were clamped into `[-clamp, +clamp]` percent before binning
    pub grade_clamp_pct: f64,
    /// Identifier of the aggregation method that produced the bins
    pub method: String,
    /// Reference curve passed through untouched, when the caller supplied
    /// one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_curve: Option<ReferenceCurve>,
}

impl GradeBinningResult {
    /// Result with no retained bins, carrying the usual metadata
    #[must_use]
    pub fn empty(config: &GradeBinningConfig, reference: Option<&ReferenceCurve>) -> Self {
        Self {
            bins: Vec::new(),
            bin_width_grade_pct: config.bin_width_percent,
            grade_clamp_pct: config.grade_clamp_percent,
            method: METHOD.to_owned(),
            reference_curve: reference.cloned(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct BinAccumulator {
    paces: Vec<f64>,
    weights: Vec<f64>,
}

/// Aggregates pace per grade bin, weighted by sample duration
///
/// Only moving samples with a positive duration participate; rows with a
/// non-finite grade, pace, or weight, or a non-positive pace, are dropped.
/// An activity yielding no usable row produces a result with zero bins,
/// not an error.
///
/// # Errors
/// Returns [`AnalysisError::InsufficientData`] when the mask, pace, or
/// grade series length disagrees with the sample count.
pub fn compute_grade_bins(
    samples: &ActivitySamples,
    mask: &MovingMask,
    pace_series: &[f64],
    grade_series: &[f64],
    reference: Option<&ReferenceCurve>,
    config: &GradeBinningConfig,
) -> AnalysisResult<GradeBinningResult> {
    let n = samples.len();
    for (name, len) in [
        ("moving mask", mask.len()),
        ("pace series", pace_series.len()),
        ("grade series", grade_series.len()),
    ] {
        if len != n {
            return Err(AnalysisError::insufficient(format!(
                "{name} covers {len} samples, expected {n}"
            )));
        }
    }

    let width = config.bin_width_percent;
    let clamp = config.grade_clamp_percent;
    let half_bins = (clamp / width).round() as i64;
    let bin_count = usize::try_from(2 * half_bins + 1).unwrap_or(1);
    let mut accumulators = vec![BinAccumulator::default(); bin_count];

    let mut rows = 0usize;
    for i in 0..n {
        if !mask.is_moving(i) {
            continue;
        }
        let weight = samples.delta_time_s[i];
        let grade = grade_series[i];
        let pace = pace_series[i];
        if !weight.is_finite() || !grade.is_finite() || !pace.is_finite() {
            continue;
        }
        if weight <= 0.0 || pace <= 0.0 {
            continue;
        }
        let clamped = grade.clamp(-clamp, clamp);
        let k = (clamped / width - 0.5).ceil() as i64;
        let k = k.clamp(-half_bins, half_bins);
        let idx = usize::try_from(k + half_bins).unwrap_or(0);
        accumulators[idx].paces.push(pace);
        accumulators[idx].weights.push(weight);
        rows += 1;
    }

    let mut bins = Vec::new();
    for (idx, acc) in accumulators.iter().enumerate() {
        if acc.weights.is_empty() {
            continue;
        }
        let center = (idx as f64 - half_bins as f64) * width;
        if let Some(bin) = aggregate_bin(center, acc, config) {
            bins.push(bin);
        }
    }

    debug!(rows, bins = bins.len(), "grade bins computed");
    Ok(GradeBinningResult {
        bins,
        bin_width_grade_pct: width,
        grade_clamp_pct: clamp,
        method: METHOD.to_owned(),
        reference_curve: reference.cloned(),
    })
}

/// Winsorizes when the bin is well-supported, aggregates, and applies the
/// reporting gate
fn aggregate_bin(
    center: f64,
    acc: &BinAccumulator,
    config: &GradeBinningConfig,
) -> Option<GradeBin> {
    let time_s_bin: f64 = acc.weights.iter().sum();
    let pace_n = acc.paces.len();
    let pace_n_eff = series::effective_sample_size(&acc.weights);

    let mut values = acc.paces.clone();
    let mut outlier_clip_frac = 0.0;
    if time_s_bin >= config.winsor_min_time_s && pace_n_eff >= config.winsor_min_n_eff {
        if let Some((lo, hi)) = winsor_bounds(&values, &acc.weights, config) {
            if hi > lo {
                let outside: f64 = values
                    .iter()
                    .zip(&acc.weights)
                    .filter(|(v, _)| **v < lo || **v > hi)
                    .map(|(_, w)| w)
                    .sum();
                outlier_clip_frac = outside / time_s_bin;
                for v in &mut values {
                    *v = v.clamp(lo, hi);
                }
            }
        }
    }

    let pace_q25_s_per_km = series::weighted_quantile_step(&values, &acc.weights, 0.25);
    let weighted_median = series::weighted_quantile_step(&values, &acc.weights, 0.5);
    let pace_q75_s_per_km = series::weighted_quantile_step(&values, &acc.weights, 0.75);
    let pace_med_s_per_km = if weighted_median.is_finite() {
        weighted_median
    } else {
        series::median(&values)
    };

    if !pace_med_s_per_km.is_finite()
        || time_s_bin < config.report_min_time_s
        || pace_n_eff < config.report_min_n_eff
    {
        return None;
    }

    Some(GradeBin {
        grade_bin_center: center,
        pace_med_s_per_km,
        pace_mean_w_s_per_km: series::weighted_mean(&values, &acc.weights),
        pace_std_s_per_km: series::sample_std(&values),
        pace_std_w_s_per_km: series::weighted_std(&values, &acc.weights),
        pace_q25_s_per_km,
        pace_q75_s_per_km,
        pace_n,
        pace_n_eff,
        time_s_bin,
        outlier_clip_frac,
    })
}

/// Clipping bounds from the weighted IQR, falling back to MAD-based bounds
/// when the quartiles collapse; `None` when both spreads are degenerate
fn winsor_bounds(
    values: &[f64],
    weights: &[f64],
    config: &GradeBinningConfig,
) -> Option<(f64, f64)> {
    let q25 = series::weighted_quantile_step(values, weights, 0.25);
    let q75 = series::weighted_quantile_step(values, weights, 0.75);
    if q25.is_finite() && q75.is_finite() {
        let iqr = q75 - q25;
        if iqr > binning::SPREAD_EPSILON {
            return Some((
                config.winsor_k_iqr.mul_add(-iqr, q25),
                config.winsor_k_iqr.mul_add(iqr, q75),
            ));
        }
    }
    let med = series::weighted_quantile_step(values, weights, 0.5);
    if !med.is_finite() {
        return None;
    }
    let deviations: Vec<f64> = values.iter().map(|v| (v - med).abs()).collect();
    let mad = series::weighted_quantile_step(&deviations, weights, 0.5);
    if !mad.is_finite() || mad <= binning::SPREAD_EPSILON {
        return None;
    }
    let sigma = binning::MAD_SIGMA_SCALE * mad;
    Some((
        config.winsor_k_mad_sigma.mul_add(-sigma, med),
        config.winsor_k_mad_sigma.mul_add(sigma, med),
    ))
}
