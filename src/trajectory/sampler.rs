//! Seeded random walks in parameter space and their smooth dense resampling.
//!
//! Every forecast path is built the same way: a short random walk produces
//! control points, a natural cubic spline per coordinate is fitted against
//! evenly spaced knots on `[0, 1]`, and the splines are evaluated on a finer
//! grid. Both control points and dense samples are wrapped onto `[0, 2π)`.
//!
//! The spline is fitted on the wrapped control values, so a walk that crosses
//! the seam makes the dense path sweep back across the parameter domain
//! between two knots.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::path::Path;
use crate::geom::{CubicSpline, ParamPoint, SplineError, TorusSurface, linspace, wrap_angle};

/// Half-open interval `[min, max)` a step component is drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRange {
    pub min: f64,
    pub max: f64,
}

impl StepRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> f64 {
        if self.max > self.min {
            rng.random_range(self.min..self.max)
        } else {
            self.min
        }
    }
}

/// Step ranges of one walk variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkProfile {
    pub du: StepRange,
    pub dv: StepRange,
}

impl WalkProfile {
    /// Weekly measurements before the forecast starts.
    pub const HISTORICAL: Self = Self {
        du: StepRange::new(-0.12, 0.18),
        dv: StepRange::new(-0.10, 0.12),
    };

    /// Drift with no intervention applied.
    pub const STATUS_QUO: Self = Self {
        du: StepRange::new(0.15, 0.30),
        dv: StepRange::new(0.10, 0.25),
    };

    /// Slow, stable progression of the healthy reference population.
    pub const HEALTHY: Self = Self {
        du: StepRange::new(0.08, 0.15),
        dv: StepRange::new(0.05, 0.12),
    };
}

/// Scaling applied to every step of an intervention walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepShaping {
    /// Multiplies both step components.
    pub step_factor: f64,
    /// The random rotation angle drawn for each step is scaled by
    /// `curvature_factor - 1`; a factor of 1 leaves steps unrotated.
    pub curvature_factor: f64,
}

/// `max(5, months + 2)`.
#[must_use]
pub fn control_count(months: u32) -> usize {
    (months as usize + 2).max(5)
}

/// `30 + 10 * months`.
#[must_use]
pub fn sample_count(months: u32) -> usize {
    30 + 10 * months as usize
}

/// Cumulative random walk of `count` points starting at `start`.
///
/// Without shaping each step draws `du` then `dv`. With shaping each step
/// draws `du`, `dv` and a rotation angle in `[0, 2π)`; the scaled step is
/// rotated by `angle · (curvature_factor - 1)`.
pub fn random_walk<R: Rng + ?Sized>(
    rng: &mut R,
    start: ParamPoint,
    count: usize,
    profile: &WalkProfile,
    shaping: Option<StepShaping>,
) -> (Vec<f64>, Vec<f64>) {
    let count = count.max(1);
    let mut us = Vec::with_capacity(count);
    let mut vs = Vec::with_capacity(count);
    let (mut u, mut v) = (start.u, start.v);
    us.push(u);
    vs.push(v);

    for _ in 1..count {
        let (du, dv) = match shaping {
            None => {
                let du = profile.du.sample(rng);
                let dv = profile.dv.sample(rng);
                (du, dv)
            }
            Some(shape) => {
                let du = profile.du.sample(rng) * shape.step_factor;
                let dv = profile.dv.sample(rng) * shape.step_factor;
                let angle = rng.random_range(0.0..TAU) * (shape.curvature_factor - 1.0);
                let (sin, cos) = angle.sin_cos();
                (du * cos - dv * sin, du * sin + dv * cos)
            }
        };
        u = wrap_angle(u + du);
        v = wrap_angle(v + dv);
        us.push(u);
        vs.push(v);
    }

    (us, vs)
}

/// Fits natural splines through the control points and resamples them at
/// `samples` evenly spaced times.
pub fn spline_path(
    u_control: &[f64],
    v_control: &[f64],
    samples: usize,
    surface: &TorusSurface,
) -> Result<Path, SplineError> {
    let knots = linspace(0.0, 1.0, u_control.len());
    let spline_u = CubicSpline::natural(&knots, u_control)?;
    let spline_v = CubicSpline::natural(&knots, v_control)?;

    let ts = linspace(0.0, 1.0, samples);
    let u = ts.iter().map(|&t| wrap_angle(spline_u.eval(t))).collect();
    let v = ts.iter().map(|&t| wrap_angle(spline_v.eval(t))).collect();
    Ok(Path::from_params(u, v, surface))
}

/// Seeded forecast over `months` using the step ranges of `profile`.
pub fn forecast_path(
    start: ParamPoint,
    months: u32,
    seed: u64,
    profile: &WalkProfile,
    surface: &TorusSurface,
) -> Result<Path, SplineError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let (u, v) = random_walk(&mut rng, start, control_count(months), profile, None);
    spline_path(&u, &v, sample_count(months), surface)
}

/// Raw weekly measurements. The points are connected directly, without a
/// spline. At least one point (the start) is always produced.
#[must_use]
pub fn historical_path(start: ParamPoint, weeks: usize, seed: u64, surface: &TorusSurface) -> Path {
    let mut rng = StdRng::seed_from_u64(seed);
    let (u, v) = random_walk(&mut rng, start, weeks, &WalkProfile::HISTORICAL, None);
    Path::from_params(u, v, surface)
}

pub fn status_quo_path(
    start: ParamPoint,
    months: u32,
    seed: u64,
    surface: &TorusSurface,
) -> Result<Path, SplineError> {
    forecast_path(start, months, seed, &WalkProfile::STATUS_QUO, surface)
}

pub fn healthy_path(
    start: ParamPoint,
    months: u32,
    seed: u64,
    surface: &TorusSurface,
) -> Result<Path, SplineError> {
    forecast_path(start, months, seed, &WalkProfile::HEALTHY, surface)
}

/// Upper and lower edge of the healthy population band.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HealthyBand {
    pub upper: Path,
    pub lower: Path,
}

/// Offsets every sample of `path` by `±width` in `v`, keeping `u`.
#[must_use]
pub fn healthy_band(path: &Path, width: f64, surface: &TorusSurface) -> HealthyBand {
    let shifted = |offset: f64| {
        let v = path.v().iter().map(|&v| wrap_angle(v + offset)).collect();
        Path::from_params(path.u().to_vec(), v, surface)
    };
    HealthyBand {
        upper: shifted(width),
        lower: shifted(-width),
    }
}
