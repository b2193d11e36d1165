//! Scalar summaries of a dense 3-D path.
//!
//! - velocity: mean segment length, scaled.
//! - acceleration: mean norm of the second difference, scaled.
//! - uncertainty: mean distance between the raw path and its Gaussian
//!   smoothed copy, scaled, plus a uniform jitter.
//!
//! Paths too short for a quantity report its fallback constant instead.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::path::Path;
use crate::geom::gaussian_filter1d;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub velocity: f64,
    pub acceleration: f64,
    pub uncertainty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub velocity_scale: f64,
    pub acceleration_scale: f64,
    pub uncertainty_scale: f64,
    pub smoothing_sigma: f64,
    pub jitter_min: f64,
    pub jitter_max: f64,
    pub velocity_fallback: f64,
    pub acceleration_fallback: f64,
    pub uncertainty_fallback: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            velocity_scale: 100.0,
            acceleration_scale: 1000.0,
            uncertainty_scale: 50.0,
            smoothing_sigma: 3.0,
            jitter_min: 0.05,
            jitter_max: 0.15,
            velocity_fallback: 0.1,
            acceleration_fallback: 0.01,
            uncertainty_fallback: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricsError {
    #[error("coordinate arrays differ in length (x={x}, y={y}, z={z})")]
    LengthMismatch { x: usize, y: usize, z: usize },
    #[error("path contains non-finite coordinates")]
    NonFinite,
}

fn norm3(dx: f64, dy: f64, dz: f64) -> f64 {
    (dx * dx + dy * dy + dz * dz).sqrt()
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    values.sum::<f64>() / n as f64
}

fn diff(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

fn mean_segment_length(dx: &[f64], dy: &[f64], dz: &[f64]) -> f64 {
    mean((0..dx.len()).map(|i| norm3(dx[i], dy[i], dz[i])))
}

/// Extracts metrics from parallel coordinate arrays. `rng` is only used for
/// the uncertainty jitter, once, when the path has at least four points.
pub fn extract_metrics<R: Rng + ?Sized>(
    x: &[f64],
    y: &[f64],
    z: &[f64],
    config: &MetricsConfig,
    rng: &mut R,
) -> Result<Metrics, MetricsError> {
    if x.len() != y.len() || x.len() != z.len() {
        return Err(MetricsError::LengthMismatch {
            x: x.len(),
            y: y.len(),
            z: z.len(),
        });
    }
    if x.iter().chain(y).chain(z).any(|c| !c.is_finite()) {
        return Err(MetricsError::NonFinite);
    }

    let n = x.len();
    let (dx, dy, dz) = (diff(x), diff(y), diff(z));

    let velocity = if n >= 2 {
        mean_segment_length(&dx, &dy, &dz) * config.velocity_scale
    } else {
        config.velocity_fallback
    };

    let acceleration = if n >= 3 {
        mean_segment_length(&diff(&dx), &diff(&dy), &diff(&dz)) * config.acceleration_scale
    } else {
        config.acceleration_fallback
    };

    let uncertainty = if n >= 4 {
        let sx = gaussian_filter1d(x, config.smoothing_sigma);
        let sy = gaussian_filter1d(y, config.smoothing_sigma);
        let sz = gaussian_filter1d(z, config.smoothing_sigma);
        let deviation = mean((0..n).map(|i| norm3(x[i] - sx[i], y[i] - sy[i], z[i] - sz[i])));
        deviation * config.uncertainty_scale + jitter(config, rng)
    } else {
        config.uncertainty_fallback
    };

    Ok(Metrics {
        velocity,
        acceleration,
        uncertainty,
    })
}

pub fn path_metrics<R: Rng + ?Sized>(
    path: &Path,
    config: &MetricsConfig,
    rng: &mut R,
) -> Result<Metrics, MetricsError> {
    extract_metrics(path.x(), path.y(), path.z(), config, rng)
}

fn jitter<R: Rng + ?Sized>(config: &MetricsConfig, rng: &mut R) -> f64 {
    if config.jitter_max > config.jitter_min {
        rng.random_range(config.jitter_min..config.jitter_max)
    } else {
        config.jitter_min
    }
}
