//! Opt-in timing hooks for the trajectory engine.
//!
//! Timing is only collected when the `engine_metrics` feature is enabled and
//! the target is not WASM (`std::time::Instant` is unavailable there). In all
//! other builds the hooks compile to plain closure calls and
//! [`Timings::end`] returns `None`.
//!
//! ```ignore
//! let mut timings = Timings::default();
//! timings.begin();
//! let path = timings.time(TimingBucket::Sampling, || status_quo_path(...));
//! if let Some(report) = timings.end() {
//!     println!("sampling: {} ns", report.sampling_ns);
//! }
//! ```

/// Phases of one recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Surface vertex/normal generation.
    Tessellation,
    /// Grid index generation.
    Triangulation,
    /// Random walks and control-point generation.
    Sampling,
    /// Spline fitting and dense resampling.
    SplineFit,
    /// Path blending.
    Blend,
    /// Velocity/acceleration/uncertainty extraction and report assembly.
    Metrics,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TimingReport {
    pub tessellation_ns: u64,
    pub triangulation_ns: u64,
    pub sampling_ns: u64,
    pub spline_fit_ns: u64,
    pub blend_ns: u64,
    pub metrics_ns: u64,
}

impl TimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.tessellation_ns
            .saturating_add(self.triangulation_ns)
            .saturating_add(self.sampling_ns)
            .saturating_add(self.spline_fit_ns)
            .saturating_add(self.blend_ns)
            .saturating_add(self.metrics_ns)
    }

    /// Returns the total time in milliseconds (for display purposes).
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

/// Accumulator for timing engine phases.
#[derive(Debug, Default)]
pub struct Timings {
    #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
    report: TimingReport,
}

impl Timings {
    /// Resets all counters.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
        {
            self.report = TimingReport::default();
        }
    }

    #[must_use]
    pub fn end(&self) -> Option<TimingReport> {
        #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "engine_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Runs `f` and adds the elapsed time to `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            self.add_to_bucket(bucket, nanos);
            result
        }

        #[cfg(not(all(feature = "engine_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }

    #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
    fn add_to_bucket(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = match bucket {
            TimingBucket::Tessellation => &mut self.report.tessellation_ns,
            TimingBucket::Triangulation => &mut self.report.triangulation_ns,
            TimingBucket::Sampling => &mut self.report.sampling_ns,
            TimingBucket::SplineFit => &mut self.report.spline_fit_ns,
            TimingBucket::Blend => &mut self.report.blend_ns,
            TimingBucket::Metrics => &mut self.report.metrics_ns,
        };
        *slot = slot.saturating_add(nanos);
    }
}
