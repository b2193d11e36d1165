//! Eén synchrone herberekening van alle paden, metrics en het vergelijkingsrecord.

use std::sync::Arc;

use rand::Rng;
use serde::Serialize;

use super::TrajectoryError;
use super::blend::blend;
use super::cache::{PathKey, PathKind, TrajectoryCache};
use super::coupling::{CoupledDelta, couple};
use super::intervention::{InterventionVector, PathShaping, compute_path};
use super::metrics::{Metrics, path_metrics};
use super::path::Path;
use super::report::{ComparisonInputs, ComparisonRecord, build_comparison};
use super::sampler::{HealthyBand, healthy_band, healthy_path, historical_path, status_quo_path};
use crate::config::EngineConfig;
use crate::geom::{GeomMesh, GeomMeshDiagnostics, build_mesh};
use crate::timing::{TimingBucket, TimingReport, Timings};

/// Ondersteunde voorspellingshorizonnen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "u32")]
pub enum TimeHorizon {
    Three,
    Six,
    #[default]
    Twelve,
}

impl TimeHorizon {
    pub const ALL: [TimeHorizon; 3] = [TimeHorizon::Three, TimeHorizon::Six, TimeHorizon::Twelve];

    #[must_use]
    pub const fn months(self) -> u32 {
        match self {
            TimeHorizon::Three => 3,
            TimeHorizon::Six => 6,
            TimeHorizon::Twelve => 12,
        }
    }
}

impl TryFrom<u32> for TimeHorizon {
    type Error = TrajectoryError;

    fn try_from(months: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|horizon| horizon.months() == months)
            .ok_or(TrajectoryError::UnsupportedHorizon(months))
    }
}

impl From<TimeHorizon> for u32 {
    fn from(horizon: TimeHorizon) -> Self {
        horizon.months()
    }
}

/// Invoer van één herberekening.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SceneRequest {
    pub horizon: TimeHorizon,
    pub interventions: InterventionVector,
}

/// Ruwe metrics per pad, vóór koppeling.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SceneMetrics {
    pub historical: Metrics,
    pub status_quo: Metrics,
    pub healthy: Metrics,
    /// Metrics van het geblende interventiepad.
    pub intervention: Metrics,
}

/// Alles wat de renderlaag en de rapportage nodig hebben.
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    pub horizon: TimeHorizon,
    pub interventions: InterventionVector,
    pub historical: Arc<Path>,
    pub status_quo: Arc<Path>,
    pub healthy: Arc<Path>,
    pub healthy_band: HealthyBand,
    /// Het gevormde interventiepad vóór het blenden.
    pub intervention_raw: Arc<Path>,
    /// Interventiepad richting het gezonde pad geblend; dit wordt getoond.
    pub intervention: Path,
    pub shaping: PathShaping,
    pub metrics: SceneMetrics,
    pub coupled: CoupledDelta,
    pub comparison: ComparisonRecord,
    pub timing: Option<TimingReport>,
}

impl Scene {
    /// De getoonde interventiemetrics (met gekoppelde versnelling).
    #[must_use]
    pub fn displayed_intervention(&self) -> Metrics {
        self.comparison.intervention
    }
}

/// Berekent de volledige scène voor `request`.
///
/// Historische, status-quo- en gezonde paden komen uit `cache` wanneer de
/// sleutel al bekend is. `jitter_rng` levert uitsluitend de onzekerheidsjitter,
/// in de volgorde status quo, gezond, interventie, historisch.
pub fn recompute<R: Rng + ?Sized>(
    config: &EngineConfig,
    request: &SceneRequest,
    cache: &mut TrajectoryCache,
    jitter_rng: &mut R,
) -> Result<Scene, TrajectoryError> {
    config.validate()?;
    request.interventions.validate()?;

    let surface = config.surface()?;
    let months = request.horizon.months();
    let vector = request.interventions;

    let mut timings = Timings::default();
    timings.begin();

    let historical = timings.time(TimingBucket::Sampling, || {
        let key = PathKey::new(
            PathKind::Historical,
            config.historical_weeks,
            config.start,
            config.historical_seed,
            &surface,
        );
        cache.get_or_try_insert_with(key, || {
            Ok::<_, TrajectoryError>(historical_path(
                config.start,
                config.historical_weeks as usize,
                config.historical_seed,
                &surface,
            ))
        })
    })?;

    let status_quo = timings.time(TimingBucket::SplineFit, || {
        let key = PathKey::new(PathKind::StatusQuo, months, config.start, config.status_quo_seed, &surface);
        cache.get_or_try_insert_with(key, || {
            status_quo_path(config.start, months, config.status_quo_seed, &surface)
        })
    })?;

    let healthy = timings.time(TimingBucket::SplineFit, || {
        let key = PathKey::new(
            PathKind::Healthy,
            months,
            config.healthy_start,
            config.healthy_seed,
            &surface,
        );
        cache.get_or_try_insert_with(key, || {
            healthy_path(config.healthy_start, months, config.healthy_seed, &surface)
        })
    })?;
    let band = healthy_band(&healthy, config.healthy_band_width, &surface);

    let shaping = PathShaping::derive(&vector, &config.intervention);
    let intervention_raw = timings.time(TimingBucket::SplineFit, || {
        let key = PathKey::new(
            PathKind::Intervention,
            months,
            config.start,
            u64::from(config.intervention.base_seed),
            &surface,
        )
        .with_interventions(&vector);
        cache.get_or_try_insert_with(key, || {
            compute_path(config.start, months, &vector, &config.intervention, &surface)
                .map(|(path, _)| path)
        })
    })?;

    let intervention = timings.time(TimingBucket::Blend, || {
        blend(&intervention_raw, &healthy, config.blend_alpha, &surface)
    })?;

    let (metrics, coupled, comparison) = timings.time(TimingBucket::Metrics, || {
        let status_quo_metrics = path_metrics(&status_quo, &config.metrics, jitter_rng)?;
        let healthy_metrics = path_metrics(&healthy, &config.metrics, jitter_rng)?;
        let intervention_metrics = path_metrics(&intervention, &config.metrics, jitter_rng)?;
        let historical_metrics = path_metrics(&historical, &config.metrics, jitter_rng)?;

        let coupled = couple(&status_quo_metrics, &intervention_metrics, &config.coupling);
        let comparison = build_comparison(&ComparisonInputs {
            status_quo: &status_quo_metrics,
            healthy: &healthy_metrics,
            intervention: &intervention_metrics,
            coupled: &coupled,
            interventions: &vector,
            intervention_path: &intervention_raw,
            healthy_path: &healthy,
        });
        let metrics = SceneMetrics {
            historical: historical_metrics,
            status_quo: status_quo_metrics,
            healthy: healthy_metrics,
            intervention: intervention_metrics,
        };
        Ok::<_, TrajectoryError>((metrics, coupled, comparison))
    })?;

    log::debug!(
        "scene recomputed: horizon={months} status={:?} cache={:?}",
        comparison.status,
        cache.stats()
    );

    Ok(Scene {
        horizon: request.horizon,
        interventions: vector,
        historical,
        status_quo,
        healthy,
        healthy_band: band,
        intervention_raw,
        intervention,
        shaping,
        metrics,
        coupled,
        comparison,
        timing: timings.end(),
    })
}

/// Bouwt de statische torusmesh volgens de configuratie.
pub fn build_scene_mesh(config: &EngineConfig) -> Result<(GeomMesh, GeomMeshDiagnostics), TrajectoryError> {
    config.validate()?;
    Ok(build_mesh(
        config.mesh_u,
        config.mesh_v,
        config.major_radius,
        config.minor_radius,
    )?)
}
