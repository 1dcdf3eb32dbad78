// ABOUTME: Windowed-pass statistics over f64 slices: rolling windows, interpolation, weighted quantiles
// ABOUTME: NaN-aware building blocks shared by every analysis component
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Array statistics used by the derived-series pipeline and both engines.
//!
//! All helpers treat `NaN` as "missing": missing values are excluded from
//! window numerators and denominators alike, never zero-filled. A window
//! with no finite value produces `NaN`. Centered windows truncate at the
//! array boundaries instead of reading out of range.

/// True when the slice contains at least one finite value
pub(crate) fn any_finite(values: &[f64]) -> bool {
    values.iter().any(|v| v.is_finite())
}

/// Centered-window bounds for index `i`: even windows take the extra
/// element on the left.
fn window_bounds(i: usize, n: usize, window: usize) -> (usize, usize) {
    let w = window.max(1);
    let after = (w - 1) / 2;
    let before = w - 1 - after;
    (i.saturating_sub(before), (i + after).min(n - 1))
}

/// Centered rolling median
///
/// Window `window` points wide, truncated at the boundaries; NaN values are
/// excluded, and a window with no finite value yields NaN.
#[must_use]
pub fn rolling_median_centered(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = Vec::with_capacity(n);
    let mut buf: Vec<f64> = Vec::with_capacity(window.max(1));
    for i in 0..n {
        let (lo, hi) = window_bounds(i, n, window);
        buf.clear();
        buf.extend(values[lo..=hi].iter().copied().filter(|v| v.is_finite()));
        if buf.is_empty() {
            out.push(f64::NAN);
            continue;
        }
        buf.sort_unstable_by(f64::total_cmp);
        let mid = buf.len() / 2;
        if buf.len() % 2 == 0 {
            out.push(f64::midpoint(buf[mid - 1], buf[mid]));
        } else {
            out.push(buf[mid]);
        }
    }
    out
}

/// Centered rolling mean
///
/// Same window geometry and NaN handling as [`rolling_median_centered`].
#[must_use]
pub fn rolling_mean_centered(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let (lo, hi) = window_bounds(i, n, window);
        let mut sum = 0.0;
        let mut count = 0usize;
        for &v in &values[lo..=hi] {
            if v.is_finite() {
                sum += v;
                count += 1;
            }
        }
        if count == 0 {
            out.push(f64::NAN);
        } else {
            out.push(sum / count as f64);
        }
    }
    out
}

/// Running maximum (makes a distance channel non-decreasing)
///
/// Inputs are expected to be finite; sanitize beforehand.
#[must_use]
pub fn running_max(values: &[f64]) -> Vec<f64> {
    let mut cur = f64::NEG_INFINITY;
    values
        .iter()
        .map(|&v| {
            cur = cur.max(v);
            cur
        })
        .collect()
}

/// Forward-fill then backward-fill NaN gaps
///
/// An all-NaN input stays all-NaN.
#[must_use]
pub fn fill_forward_backward(values: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::with_capacity(values.len());
    let mut last = f64::NAN;
    for &v in values {
        if v.is_finite() {
            last = v;
        }
        out.push(last);
    }
    let mut next = f64::NAN;
    for v in out.iter_mut().rev() {
        if v.is_finite() {
            next = *v;
        } else {
            *v = next;
        }
    }
    out
}

/// Indices of the last element of each equal-value run in a non-decreasing
/// slice
///
/// Used to collapse duplicate distances before interpolation: samples
/// recorded while standing still share one distance, and only the last one
/// carries the up-to-date elevation and moving time.
#[must_use]
pub fn unique_last_indices(xs: &[f64]) -> Vec<usize> {
    let mut out = Vec::with_capacity(xs.len());
    for i in 0..xs.len() {
        if i + 1 == xs.len() || !xs[i].total_cmp(&xs[i + 1]).is_eq() {
            out.push(i);
        }
    }
    out
}

/// Piecewise-linear interpolation of `(xs, ys)` at each point of
/// `sample_xs`, clamped to the end values outside the table
///
/// `xs` must be strictly increasing and `ys` the same length.
#[must_use]
pub fn interp_linear(sample_xs: &[f64], xs: &[f64], ys: &[f64]) -> Vec<f64> {
    if xs.is_empty() || xs.len() != ys.len() {
        return vec![f64::NAN; sample_xs.len()];
    }
    sample_xs
        .iter()
        .map(|&x| {
            let hi = xs.partition_point(|&v| v < x);
            if hi == 0 {
                ys[0]
            } else if hi == xs.len() {
                ys[ys.len() - 1]
            } else {
                let (x0, x1) = (xs[hi - 1], xs[hi]);
                let (y0, y1) = (ys[hi - 1], ys[hi]);
                let t = (x - x0) / (x1 - x0);
                t.mul_add(y1 - y0, y0)
            }
        })
        .collect()
}

/// Median of the finite values; NaN when none
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return f64::NAN;
    }
    finite.sort_unstable_by(f64::total_cmp);
    let mid = finite.len() / 2;
    if finite.len() % 2 == 0 {
        f64::midpoint(finite[mid - 1], finite[mid])
    } else {
        finite[mid]
    }
}

/// Sample standard deviation (one delta degree of freedom) of the finite
/// values; 0.0 with fewer than two
#[must_use]
pub fn sample_std(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 {
        return 0.0;
    }
    let mean = finite.iter().sum::<f64>() / finite.len() as f64;
    let ss: f64 = finite.iter().map(|v| (v - mean) * (v - mean)).sum();
    (ss / (finite.len() - 1) as f64).sqrt()
}

fn finite_pairs(values: &[f64], weights: &[f64]) -> Vec<(f64, f64)> {
    values
        .iter()
        .zip(weights)
        .filter(|(v, w)| v.is_finite() && w.is_finite() && **w > 0.0)
        .map(|(&v, &w)| (v, w))
        .collect()
}

/// Weighted quantile using a step-CDF definition
///
/// Returns the smallest value `v` such that the cumulative weight at `v`
/// reaches `p` times the total weight. NaN when no pair has a finite value
/// and a positive finite weight.
#[must_use]
pub fn weighted_quantile_step(values: &[f64], weights: &[f64], p: f64) -> f64 {
    let mut pairs = finite_pairs(values, weights);
    if pairs.is_empty() {
        return f64::NAN;
    }
    if pairs.len() == 1 {
        return pairs[0].0;
    }
    let p = p.clamp(0.0, 1.0);
    // Stable sort: ties keep input order, matching a step CDF exactly.
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut cumulative = Vec::with_capacity(pairs.len());
    let mut total = 0.0;
    for &(_, w) in &pairs {
        total += w;
        cumulative.push(total);
    }
    if total <= 0.0 {
        return f64::NAN;
    }
    let threshold = p * total;
    let idx = cumulative
        .partition_point(|&c| c < threshold)
        .min(pairs.len() - 1);
    pairs[idx].0
}

/// Weighted arithmetic mean; NaN when no usable pair remains
#[must_use]
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> f64 {
    let pairs = finite_pairs(values, weights);
    let total: f64 = pairs.iter().map(|(_, w)| w).sum();
    if pairs.is_empty() || total <= 0.0 {
        return f64::NAN;
    }
    pairs.iter().map(|(v, w)| v * w).sum::<f64>() / total
}

/// Weighted population standard deviation; NaN when no usable pair remains
#[must_use]
pub fn weighted_std(values: &[f64], weights: &[f64]) -> f64 {
    let pairs = finite_pairs(values, weights);
    let total: f64 = pairs.iter().map(|(_, w)| w).sum();
    if pairs.is_empty() || total <= 0.0 {
        return f64::NAN;
    }
    let mean = pairs.iter().map(|(v, w)| v * w).sum::<f64>() / total;
    let var = pairs
        .iter()
        .map(|(v, w)| w * (v - mean) * (v - mean))
        .sum::<f64>()
        / total;
    var.sqrt()
}

/// Kish effective sample size: `(sum w)^2 / sum(w^2)`
///
/// Measures how many equally-weighted samples a weighted set is worth;
/// concentrated weights pull it far below the raw count.
///
/// Reference: Kish, L. (1965). *Survey Sampling*. Wiley.
#[must_use]
pub fn effective_sample_size(weights: &[f64]) -> f64 {
    let mut s1 = 0.0;
    let mut s2 = 0.0;
    for &w in weights {
        if w.is_finite() && w > 0.0 {
            s1 += w;
            s2 += w * w;
        }
    }
    if s2 <= 0.0 {
        return 0.0;
    }
    (s1 * s1) / s2
}
