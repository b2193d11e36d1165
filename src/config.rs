//! Engine-wide configuration with every calibrated constant.
//!
//! All fields have defaults, so a partial JSON object (or `{}`) is a valid
//! configuration.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::geom::{DEFAULT_MAJOR_RADIUS, DEFAULT_MINOR_RADIUS, ParamPoint, SurfaceError, TorusSurface};
use crate::trajectory::cache::DEFAULT_CACHE_CAPACITY;
use crate::trajectory::coupling::CouplingConfig;
use crate::trajectory::intervention::InterventionConfig;
use crate::trajectory::metrics::MetricsConfig;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("mesh resolution must be at least 3x3 (got {nu}x{nv})")]
    MeshResolution { nu: usize, nv: usize },
    #[error("blend alpha must lie in [0, 1] (got {0})")]
    BlendAlpha(f64),
    #[error("`{field}` must be a finite number (got {value})")]
    NonFinite { field: &'static str, value: f64 },
    #[error("`{field}` must lie in [0, 2π) (got {value})")]
    OutsideParamDomain { field: &'static str, value: f64 },
    #[error("metrics jitter range is inverted ({min} > {max})")]
    JitterRange { min: f64, max: f64 },
    #[error("step factor bounds are inverted ({min} > {max})")]
    StepFactorRange { min: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub major_radius: f64,
    pub minor_radius: f64,
    pub mesh_u: usize,
    pub mesh_v: usize,
    /// Current patient position; start of every path except the healthy one.
    pub start: ParamPoint,
    pub healthy_start: ParamPoint,
    pub historical_weeks: u32,
    pub historical_seed: u64,
    pub status_quo_seed: u64,
    pub healthy_seed: u64,
    /// Weight of the healthy path in the displayed intervention path.
    pub blend_alpha: f64,
    pub healthy_band_width: f64,
    pub intervention: InterventionConfig,
    pub metrics: MetricsConfig,
    pub coupling: CouplingConfig,
    /// Fixed seed for the uncertainty jitter; entropy-seeded when absent.
    pub jitter_seed: Option<u64>,
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            major_radius: DEFAULT_MAJOR_RADIUS,
            minor_radius: DEFAULT_MINOR_RADIUS,
            mesh_u: 160,
            mesh_v: 70,
            start: ParamPoint::default(),
            healthy_start: ParamPoint { u: 0.0, v: 0.0 },
            historical_weeks: 3,
            historical_seed: 42,
            status_quo_seed: 43,
            healthy_seed: 100,
            blend_alpha: 0.35,
            healthy_band_width: 0.15,
            intervention: InterventionConfig::default(),
            metrics: MetricsConfig::default(),
            coupling: CouplingConfig::default(),
            jitter_seed: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

fn angle(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if (0.0..TAU).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutsideParamDomain { field, value })
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.surface()?;
        if self.mesh_u < 3 || self.mesh_v < 3 {
            return Err(ConfigError::MeshResolution {
                nu: self.mesh_u,
                nv: self.mesh_v,
            });
        }
        if !(0.0..=1.0).contains(&self.blend_alpha) {
            return Err(ConfigError::BlendAlpha(self.blend_alpha));
        }

        angle("start.u", self.start.u)?;
        angle("start.v", self.start.v)?;
        angle("healthy_start.u", self.healthy_start.u)?;
        angle("healthy_start.v", self.healthy_start.v)?;
        finite("healthy_band_width", self.healthy_band_width)?;
        finite("intervention.damping", self.intervention.damping)?;
        finite("intervention.curvature_gain", self.intervention.curvature_gain)?;
        finite("coupling.floor_ratio", self.coupling.floor_ratio)?;
        finite("metrics.smoothing_sigma", self.metrics.smoothing_sigma)?;

        let intervention = &self.intervention;
        if intervention.min_step_factor > intervention.max_step_factor {
            return Err(ConfigError::StepFactorRange {
                min: intervention.min_step_factor,
                max: intervention.max_step_factor,
            });
        }
        if self.metrics.jitter_min > self.metrics.jitter_max {
            return Err(ConfigError::JitterRange {
                min: self.metrics.jitter_min,
                max: self.metrics.jitter_max,
            });
        }
        Ok(())
    }

    pub fn surface(&self) -> Result<TorusSurface, SurfaceError> {
        TorusSurface::new(self.major_radius, self.minor_radius)
    }
}
