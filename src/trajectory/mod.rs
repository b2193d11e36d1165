//! Trajectory engine: seeded paths on the torus, intervention shaping,
//! blending, metrics and the comparison record built from them.

pub mod blend;
pub mod cache;
pub mod coupling;
pub mod intervention;
pub mod metrics;
pub mod path;
pub mod pipeline;
pub mod report;
pub mod sampler;
pub mod scenarios;

pub use blend::{BlendError, blend, resample};
pub use cache::{PathKey, PathKind, TrajectoryCache, TrajectoryCacheStats};
pub use coupling::{CoupledDelta, CouplingConfig, couple};
pub use intervention::{
    InterventionConfig, InterventionError, InterventionVector, PathShaping, Slider, SliderSpec,
    compute_path, derive_seed,
};
pub use metrics::{Metrics, MetricsConfig, MetricsError, extract_metrics, path_metrics};
pub use path::Path;
pub use pipeline::{Scene, SceneMetrics, SceneRequest, TimeHorizon, build_scene_mesh, recompute};
pub use report::{
    ComparisonRecord, FactorImpact, ReportSummarizer, SummaryError, TemplateSummarizer,
    TrajectoryStatus, summarize_or_message,
};
pub use sampler::{HealthyBand, healthy_path, historical_path, status_quo_path};
pub use scenarios::{Preset, SCENARIOS, Scenario, TIMELINES, Timeline, resolve_preset};

use crate::config::ConfigError;
use crate::geom::{SplineError, SurfaceError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrajectoryError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("spline fit failed: {0}")]
    Spline(#[from] SplineError),
    #[error(transparent)]
    Intervention(#[from] InterventionError),
    #[error(transparent)]
    Blend(#[from] BlendError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error("unsupported time horizon: {0} months (expected 3, 6 or 12)")]
    UnsupportedHorizon(u32),
    #[error("unknown scenario or timeline `{0}`")]
    UnknownPreset(String),
}

#[cfg(test)]
mod tests;
