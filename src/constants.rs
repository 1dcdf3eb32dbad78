//! Default numeric parameters for the terrain analysis pipeline
//!
//! Every tunable used by the analysis components lives here with its
//! rationale. Runtime overrides go through [`crate::config::AnalysisConfig`];
//! nothing reads these values directly at call time.

/// Moving/paused classification parameters
///
/// The detector mirrors how mainstream trackers derive "moving time":
/// smooth the instantaneous speed, then require a sustained sub-threshold
/// interval before declaring a pause.
pub mod moving {
    /// Speed below which a sample is a pause candidate (m/s)
    ///
    /// 0.5 m/s is below any plausible walking speed, so genuine walking
    /// sections stay classified as moving.
    pub const SPEED_THRESHOLD_M_S: f64 = 0.5;

    /// Minimum sustained sub-threshold duration before a pause is declared (s)
    ///
    /// Debounce: shorter dips (a stumble, a tight turn under tree cover)
    /// stay classified as moving.
    pub const MIN_PAUSE_DURATION_S: f64 = 5.0;

    /// Centered rolling-median window applied to speed before thresholding (points)
    ///
    /// Three points is enough to suppress single-sample GPS speed spikes
    /// without delaying real stop/start transitions.
    pub const SPEED_MEDIAN_WINDOW_POINTS: usize = 3;
}

/// Pace-series smoothing and capping parameters
pub mod pace {
    /// Extra points folded into the centered rolling mean (window = points + 1)
    pub const SMOOTHING_POINTS: usize = 20;

    /// Default cap as a multiple of the activity's average pace
    ///
    /// Values above 1.4x the average pace are almost always GPS artifacts
    /// (near-zero distance deltas), not running.
    pub const DEFAULT_CAP_FACTOR: f64 = 1.4;

    /// Cap fallback when the average pace cannot be derived (min/km)
    pub const FALLBACK_CAP_MIN_PER_KM: f64 = 8.0;
}

/// Per-sample grade-series parameters
pub mod grade {
    /// Centered rolling-mean window applied to elevation before differencing (points)
    pub const SMOOTH_WINDOW_POINTS: usize = 5;

    /// Minimum distance step for a meaningful grade quotient (m)
    ///
    /// Below this the elevation delta divided by the distance delta is
    /// numerically meaningless; the grade sample becomes NaN instead.
    pub const MIN_DISTANCE_STEP_M: f64 = 1.0;
}

/// Climb segmentation parameters
///
/// The engine works in the distance domain: the activity is resampled onto
/// a uniform grid, elevation is smoothed over a distance window, and grade
/// is computed over a distance lag. Thresholds form a hysteresis
/// (start > continue > gap) so the state machine does not flap on noise.
pub mod climb {
    /// Distance-grid resolution (m)
    pub const GRID_STEP_M: f64 = 5.0;

    /// Distance lag over which grade is computed (m)
    pub const GRADE_WINDOW_M: f64 = 50.0;

    /// Distance window for the grid elevation moving average (m)
    pub const ELEVATION_SMOOTH_WINDOW_M: f64 = 25.0;

    /// Grade required to start a candidate climb (%)
    pub const START_GRADE_PCT: f64 = 3.0;

    /// Grade required to keep a climb open without gap accounting (%)
    pub const CONTINUE_GRADE_PCT: f64 = 1.0;

    /// Grade above which a shallow stretch counts as a tolerated replat (%)
    pub const GAP_GRADE_PCT: f64 = 0.2;

    /// Maximum cumulative replat distance before the climb closes (m)
    pub const GAP_MAX_DISTANCE_M: f64 = 120.0;

    /// Maximum cumulative replat moving time before the climb closes (s)
    pub const GAP_MAX_TIME_S: f64 = 30.0;

    /// Grade at or below which grid points count towards a descent exit (%)
    pub const DESCENT_GRADE_PCT: f64 = -1.0;

    /// Sustained descent distance that closes the climb (m)
    pub const DESCENT_DISTANCE_M: f64 = 30.0;

    /// Sustained above-start-grade distance required to confirm entry (m)
    pub const START_CONFIRM_DISTANCE_M: f64 = 20.0;

    /// Minimum elevation gain for a reportable climb (m)
    pub const MIN_GAIN_M: f64 = 15.0;

    /// Minimum moving duration for a reportable climb (s)
    pub const MIN_DURATION_S: f64 = 45.0;

    /// Minimum distance for a reportable climb (m)
    pub const MIN_DISTANCE_M: f64 = 150.0;
}

/// Pace-vs-grade binning parameters
pub mod binning {
    /// Grades are clamped to +/- this bound before binning (%)
    pub const GRADE_CLAMP_PCT: f64 = 20.0;

    /// Bin width; bins are centered on integer multiples of the width (%)
    ///
    /// With the default clamp this yields 41 bins centered on -20..=+20.
    pub const BIN_WIDTH_PCT: f64 = 1.0;

    /// Reporting gate: minimum summed time weight for a bin to be reported (s)
    pub const REPORT_MIN_TIME_S: f64 = 20.0;

    /// Reporting gate: minimum Kish effective sample size for a bin to be reported
    pub const REPORT_MIN_N_EFF: f64 = 5.0;

    /// Winsorization gate: minimum summed time weight before outlier clipping (s)
    ///
    /// Stricter than the reporting gate: clipping a poorly-supported bin
    /// does more harm than reporting it raw.
    pub const WINSOR_MIN_TIME_S: f64 = 30.0;

    /// Winsorization gate: minimum Kish effective sample size before clipping
    pub const WINSOR_MIN_N_EFF: f64 = 8.0;

    /// IQR multiple for winsorization bounds: [q25 - k*IQR, q75 + k*IQR]
    pub const WINSOR_K_IQR: f64 = 2.0;

    /// MAD-sigma multiple for the fallback bounds: median +/- k * sigma
    pub const WINSOR_K_MAD_SIGMA: f64 = 4.0;

    /// Consistency factor relating MAD to the standard deviation of a
    /// normal distribution: sigma = 1.4826 * MAD
    ///
    /// Reference: Rousseeuw, P.J. & Croux, C. (1993). "Alternatives to the
    /// Median Absolute Deviation." *JASA*, 88(424), 1273-1283.
    pub const MAD_SIGMA_SCALE: f64 = 1.4826;

    /// Spread below which IQR/MAD are treated as zero (degenerate bin)
    pub const SPREAD_EPSILON: f64 = 1e-9;
}
