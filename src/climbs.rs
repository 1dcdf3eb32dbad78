// ABOUTME: Climb segmentation over a uniform distance grid with hysteresis state machine
// ABOUTME: Detects sustained ascents, bridges replats, and measures each segment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Climb segmentation.
//!
//! Sample spacing varies with speed, so grade thresholds applied per sample
//! over- or under-segment depending on how fast the runner moved. The
//! engine instead resamples elevation and moving time onto a uniform
//! distance grid, measures grade over a fixed distance lag, and walks the
//! grid with an asymmetric enter/continue/exit state machine: a climb needs
//! a sustained steep run to open, survives short flat shelves (replats)
//! within a gap budget, and closes on a genuine descent. Segment metrics
//! are then recomputed over the original sample range.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::ClimbConfig;
use crate::errors::{AnalysisError, AnalysisResult};
use crate::moving::MovingMask;
use crate::samples::ActivitySamples;
use crate::series;

/// One detected sustained-ascent segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimbSegment {
    /// First sample index of the climb (inclusive)
    pub start_idx: usize,
    /// Last sample index of the climb (inclusive)
    pub end_idx: usize,
    /// Distance covered by the climb, in meters
    pub distance_m: f64,
    /// Sum of positive smoothed-elevation increments, in meters
    pub elevation_gain_m: f64,
    /// Mean grade: gain over distance, in percent
    pub avg_grade_percent: f64,
    /// Vertical ascent rate: gain over moving time, in meters per hour
    pub vam_m_h: f64,
    /// Median moving pace inside the climb, in s/km; absent when no moving
    /// sample in range carries a finite positive pace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace_s_per_km: Option<f64>,
    /// Moving time spent on the climb, in seconds
    pub duration_s: f64,
}

/// Uniform distance grid the state machine walks; never exposed
struct GridSeries {
    /// Grid distances in meters, spaced `step` apart
    points: Vec<f64>,
    /// Smoothed elevation at each grid point
    elev_smooth: Vec<f64>,
    /// Cumulative moving time interpolated onto the grid
    time: Vec<f64>,
    /// Lag-window grade at each grid point; NaN during the warm-up lag
    grade: Vec<f64>,
    step: f64,
    lag: usize,
}

/// Sample-domain series the segment metrics are measured against
struct ClimbContext<'a> {
    dist: &'a [f64],
    moving_time: &'a [f64],
    mask: &'a MovingMask,
    pace: Option<&'a [f64]>,
    config: &'a ClimbConfig,
}

/// Detects sustained-ascent segments
///
/// `pace_series` is the shared smoothed pace series; pass `None` when it
/// could not be built, climbs are then reported without a pace. Returns the
/// qualifying segments sorted by elevation gain descending, ties broken by
/// start index. Activities with no qualifying ascent, or too short to grid,
/// yield an empty list.
///
/// # Errors
/// Returns [`AnalysisError::InsufficientData`] when the mask or pace series
/// length disagrees with the sample count, or when the elevation channel
/// carries no finite value.
pub fn detect_climbs(
    samples: &ActivitySamples,
    mask: &MovingMask,
    pace_series: Option<&[f64]>,
    config: &ClimbConfig,
) -> AnalysisResult<Vec<ClimbSegment>> {
    let n = samples.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    if mask.len() != n {
        return Err(AnalysisError::insufficient(format!(
            "moving mask covers {} samples, expected {n}",
            mask.len()
        )));
    }
    if let Some(pace) = pace_series {
        if pace.len() != n {
            return Err(AnalysisError::insufficient(format!(
                "pace series covers {} samples, expected {n}",
                pace.len()
            )));
        }
    }
    if !series::any_finite(&samples.elevation_m) {
        return Err(AnalysisError::insufficient(
            "elevation channel entirely non-finite",
        ));
    }

    let sanitized: Vec<f64> = samples
        .cumulative_distance_m
        .iter()
        .map(|&v| if v.is_finite() { v } else { 0.0 })
        .collect();
    let dist = series::running_max(&sanitized);
    let elev = series::fill_forward_backward(&samples.elevation_m);
    let mut moving_time = Vec::with_capacity(n);
    let mut cum = 0.0;
    for i in 0..n {
        let dt = samples.delta_time_s[i];
        if mask.is_moving(i) && dt.is_finite() {
            cum += dt;
        }
        moving_time.push(cum);
    }

    let Some(grid) = build_grid(&dist, &elev, &moving_time, config) else {
        debug!("activity too short to grid, no climbs");
        return Ok(Vec::new());
    };
    let spans = find_spans(&grid, config);

    let ctx = ClimbContext {
        dist: &dist,
        moving_time: &moving_time,
        mask,
        pace: pace_series,
        config,
    };
    let mut climbs: Vec<ClimbSegment> = spans
        .iter()
        .filter_map(|&span| measure_span(&ctx, &grid, span))
        .collect();
    climbs.sort_by(|a, b| {
        b.elevation_gain_m
            .total_cmp(&a.elevation_gain_m)
            .then_with(|| a.start_idx.cmp(&b.start_idx))
    });

    debug!(
        grid_points = grid.points.len(),
        candidates = spans.len(),
        climbs = climbs.len(),
        "climb detection finished"
    );
    Ok(climbs)
}

/// Resamples the activity onto the uniform grid; `None` when fewer than two
/// distinct distances or grid points exist
fn build_grid(
    dist: &[f64],
    elev: &[f64],
    moving_time: &[f64],
    config: &ClimbConfig,
) -> Option<GridSeries> {
    let keep = series::unique_last_indices(dist);
    if keep.len() < 2 {
        return None;
    }
    let xs: Vec<f64> = keep.iter().map(|&i| dist[i]).collect();
    let es: Vec<f64> = keep.iter().map(|&i| elev[i]).collect();
    let ts: Vec<f64> = keep.iter().map(|&i| moving_time[i]).collect();
    let (d0, d1) = (xs[0], xs[xs.len() - 1]);
    if d1 <= d0 {
        return None;
    }

    let step = config.grid_step_m;
    let count = ((d1 + step - d0) / step).ceil() as usize;
    if count < 2 {
        return None;
    }
    let points: Vec<f64> = (0..count).map(|i| step.mul_add(i as f64, d0)).collect();
    let grid_elev = series::interp_linear(&points, &xs, &es);
    let time = series::interp_linear(&points, &xs, &ts);

    let smooth_pts = ((config.elevation_smooth_window_m / step).round() as usize).max(1);
    let elev_smooth = series::rolling_mean_centered(&grid_elev, smooth_pts);

    let lag = ((config.grade_window_m / step).round() as usize).max(1);
    let mut grade = vec![f64::NAN; points.len()];
    for i in lag..points.len() {
        grade[i] = (elev_smooth[i] - elev_smooth[i - lag]) / config.grade_window_m * 100.0;
    }

    Some(GridSeries {
        points,
        elev_smooth,
        time,
        grade,
        step,
        lag,
    })
}

/// Hysteresis state over the grid walk
struct ClimbTracker<'a> {
    config: &'a ClimbConfig,
    step: f64,
    lag: usize,
    spans: Vec<(usize, usize)>,
    in_seg: bool,
    seg_start: usize,
    last_ok: usize,
    start_run_m: f64,
    gap_m: f64,
    gap_t: f64,
    downhill_m: f64,
    downhill_start: Option<usize>,
}

impl<'a> ClimbTracker<'a> {
    fn new(config: &'a ClimbConfig, step: f64, lag: usize) -> Self {
        Self {
            config,
            step,
            lag,
            spans: Vec::new(),
            in_seg: false,
            seg_start: 0,
            last_ok: 0,
            start_run_m: 0.0,
            gap_m: 0.0,
            gap_t: 0.0,
            downhill_m: 0.0,
            downhill_start: None,
        }
    }

    fn on_missing_grade(&mut self, delta_t: f64) {
        if self.in_seg {
            self.gap_m += self.step;
            self.gap_t += delta_t;
            if self.gap_exceeded() {
                self.close_at_last_ok();
            }
        } else {
            self.start_run_m = 0.0;
        }
    }

    fn on_searching(&mut self, i: usize, grade: f64) {
        if grade < self.config.start_grade_percent {
            self.start_run_m = 0.0;
            return;
        }
        self.start_run_m += self.step;
        if self.start_run_m >= self.config.start_confirm_distance_m {
            // Open retroactively at the toe of the sustained run, shifted
            // back by the grade lag.
            let run_pts = (self.start_run_m / self.step).round() as usize;
            let raw_start = (i + 1).saturating_sub(run_pts);
            self.in_seg = true;
            self.seg_start = raw_start.saturating_sub(self.lag);
            self.last_ok = i;
            self.gap_m = 0.0;
            self.gap_t = 0.0;
            self.downhill_m = 0.0;
            self.downhill_start = None;
            trace!(grid_idx = i, seg_start = self.seg_start, "climb opened");
        }
    }

    fn on_in_climb(&mut self, i: usize, grade: f64, delta_t: f64) {
        if grade <= self.config.descent_grade_percent {
            if self.downhill_start.is_none() {
                self.downhill_start = Some(i);
            }
            self.downhill_m += self.step;
            if self.downhill_m >= self.config.descent_distance_m {
                let descent_start = self.downhill_start.unwrap_or(i);
                if descent_start > self.seg_start + 1 {
                    self.spans.push((self.seg_start, descent_start - 1));
                    trace!(grid_idx = i, "climb closed on descent");
                }
                self.reset_to_search();
                return;
            }
        } else {
            self.downhill_m = 0.0;
            self.downhill_start = None;
        }

        if grade >= self.config.continue_grade_percent {
            self.gap_m = 0.0;
            self.gap_t = 0.0;
            self.last_ok = i;
            return;
        }
        self.gap_m += self.step;
        self.gap_t += delta_t;
        if grade >= self.config.gap_grade_percent {
            // Soft gap: the endpoint advances, the budget keeps accruing.
            self.last_ok = i;
            return;
        }
        if self.gap_exceeded() {
            self.close_at_last_ok();
        }
    }

    fn gap_exceeded(&self) -> bool {
        self.gap_m > self.config.gap_max_distance_m || self.gap_t > self.config.gap_max_time_s
    }

    fn close_at_last_ok(&mut self) {
        if self.last_ok > self.seg_start {
            self.spans.push((self.seg_start, self.last_ok));
            trace!(
                seg_start = self.seg_start,
                seg_end = self.last_ok,
                "climb closed on gap"
            );
        }
        self.reset_to_search();
    }

    fn reset_to_search(&mut self) {
        self.in_seg = false;
        self.start_run_m = 0.0;
        self.gap_m = 0.0;
        self.gap_t = 0.0;
        self.downhill_m = 0.0;
        self.downhill_start = None;
    }

    fn finish(mut self) -> Vec<(usize, usize)> {
        if self.in_seg && self.last_ok > self.seg_start {
            self.spans.push((self.seg_start, self.last_ok));
        }
        self.spans
    }
}

fn find_spans(grid: &GridSeries, config: &ClimbConfig) -> Vec<(usize, usize)> {
    let mut tracker = ClimbTracker::new(config, grid.step, grid.lag);
    for i in 0..grid.grade.len() {
        let delta_t = if i > 0 {
            grid.time[i] - grid.time[i - 1]
        } else {
            0.0
        };
        let g = grid.grade[i];
        if !g.is_finite() {
            tracker.on_missing_grade(delta_t);
        } else if tracker.in_seg {
            tracker.on_in_climb(i, g, delta_t);
        } else {
            tracker.on_searching(i, g);
        }
    }
    tracker.finish()
}

/// Maps a grid span back to sample indices and measures the segment;
/// `None` when any qualification gate fails
fn measure_span(
    ctx: &ClimbContext<'_>,
    grid: &GridSeries,
    (gs, ge): (usize, usize),
) -> Option<ClimbSegment> {
    let n = ctx.dist.len();
    if grid.points[ge] <= grid.points[gs] {
        return None;
    }
    let start_idx = ctx
        .dist
        .partition_point(|&x| x < grid.points[gs])
        .min(n - 1);
    let end_idx = ctx
        .dist
        .partition_point(|&x| x <= grid.points[ge])
        .saturating_sub(1)
        .min(n - 1);
    if end_idx <= start_idx {
        return None;
    }

    let distance_m = ctx.dist[end_idx] - ctx.dist[start_idx];
    if distance_m < ctx.config.min_distance_m {
        return None;
    }
    let duration_s = ctx.moving_time[end_idx] - ctx.moving_time[start_idx];
    if duration_s < ctx.config.min_duration_s {
        return None;
    }
    let elevation_gain_m: f64 = grid.elev_smooth[gs..=ge]
        .windows(2)
        .map(|w| (w[1] - w[0]).max(0.0))
        .sum();
    if elevation_gain_m < ctx.config.min_gain_m {
        return None;
    }

    let avg_grade_percent = if distance_m > 0.0 {
        elevation_gain_m / distance_m * 100.0
    } else {
        f64::NAN
    };
    let vam_m_h = if duration_s > 0.0 {
        elevation_gain_m / duration_s * 3600.0
    } else {
        f64::NAN
    };
    let pace_s_per_km = ctx.pace.and_then(|pace| {
        let in_range: Vec<f64> = (start_idx..=end_idx)
            .filter(|&i| ctx.mask.is_moving(i))
            .map(|i| pace[i])
            .filter(|v| v.is_finite() && *v > 0.0)
            .collect();
        if in_range.is_empty() {
            None
        } else {
            Some(series::median(&in_range))
        }
    });

    Some(ClimbSegment {
        start_idx,
        end_idx,
        distance_m,
        elevation_gain_m,
        avg_grade_percent,
        vam_m_h,
        pace_s_per_km,
        duration_s,
    })
}
