use serde::{Deserialize, Serialize};

use super::metrics::Metrics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CouplingConfig {
    /// Minimum forced acceleration delta as a fraction of `|dv|`.
    pub floor_ratio: f64,
}

impl Default for CouplingConfig {
    fn default() -> Self {
        Self { floor_ratio: 0.5 }
    }
}

/// Displayed deltas after coupling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoupledDelta {
    pub velocity_delta: f64,
    pub acceleration_delta: f64,
    /// `a0 + acceleration_delta`.
    pub acceleration: f64,
}

/// Like `f64::signum` but `0` for zero.
fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Forces the acceleration delta to share the velocity delta's sign.
///
/// With `dv = v1 - v0` and `da = a1 - a0`: `dv == 0` gives `da = 0`; a sign
/// mismatch gives `da = sign(dv) · max(|da|, floor_ratio · |dv|)`; otherwise
/// `da` is kept.
#[must_use]
pub fn couple(reference: &Metrics, comparison: &Metrics, config: &CouplingConfig) -> CoupledDelta {
    let dv = comparison.velocity - reference.velocity;
    let da_raw = comparison.acceleration - reference.acceleration;

    let da = if dv == 0.0 {
        0.0
    } else if sign(dv) != sign(da_raw) {
        sign(dv) * da_raw.abs().max(config.floor_ratio * dv.abs())
    } else {
        da_raw
    };

    CoupledDelta {
        velocity_delta: dv,
        acceleration_delta: da,
        acceleration: reference.acceleration + da,
    }
}
