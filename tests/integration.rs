use manifold_trajectory::Engine;
use manifold_trajectory::config::EngineConfig;
use manifold_trajectory::geom::{ParamPoint, TorusSurface, to_xyz};
use manifold_trajectory::trajectory::{
    InterventionVector, SceneRequest, TimeHorizon, TrajectoryCache, TrajectoryStatus, compute_path,
    recompute,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn engine_with_seed(seed: u64) -> Engine {
    Engine::from_config(EngineConfig {
        jitter_seed: Some(seed),
        ..EngineConfig::default()
    })
    .expect("valid config")
}

#[test]
fn engine_initializes() {
    let engine = Engine::new();
    assert!(engine.is_initialized());
    assert!(engine.scene().is_none());
    assert_eq!(engine.horizon(), TimeHorizon::Twelve);
}

#[test]
fn slider_updates_require_existing_identifier() {
    let mut engine = Engine::new();
    assert_eq!(engine.set_slider("Alcohol Reduction (%)", 45.0), Ok(50.0));
    assert!(engine.set_slider("onbekend", 1.0).is_err());
}

#[test]
fn full_pipeline_is_reproducible_for_the_same_sliders() {
    let start = ParamPoint::new(1.5, 0.8);
    let config = EngineConfig {
        start,
        ..EngineConfig::default()
    };
    let request = SceneRequest {
        horizon: TimeHorizon::Twelve,
        interventions: InterventionVector::new(2.0, 25.0, 70.0, 250.0, 1200.0, 500.0),
    };

    let mut first_rng = StdRng::seed_from_u64(1);
    let mut second_rng = StdRng::seed_from_u64(2);
    let first = recompute(&config, &request, &mut TrajectoryCache::default(), &mut first_rng)
        .expect("first run");
    let second = recompute(&config, &request, &mut TrajectoryCache::default(), &mut second_rng)
        .expect("second run");

    assert_eq!(first.intervention_raw.len(), 150);
    let (a, b) = (first.displayed_intervention(), second.displayed_intervention());
    assert!((a.velocity - b.velocity).abs() < 1e-6);
    assert!((a.acceleration - b.acceleration).abs() < 1e-6);

    assert_eq!(first.metrics.status_quo.velocity, second.metrics.status_quo.velocity);

    // Only the jitter term differs; it lies in [0.05, 0.15).
    let jitter_spread = (a.uncertainty - b.uncertainty).abs();
    assert!(jitter_spread < 0.1 + 1e-9);
    assert!(a.uncertainty >= 0.05 && b.uncertainty >= 0.05);
}

#[test]
fn intervention_path_depends_only_on_sliders() {
    let torus = TorusSurface::default();
    let config = EngineConfig::default();
    let vector = InterventionVector::new(1.0, 10.0, 30.0, 100.0, 0.0, 0.0);
    let (a, _) = compute_path(config.start, 6, &vector, &config.intervention, &torus).expect("path");
    let (b, _) = compute_path(config.start, 6, &vector, &config.intervention, &torus).expect("path");
    assert_eq!(a, b);

    for i in 0..a.len() {
        let p = a.param(i).expect("param");
        let q = a.position(i).expect("position");
        assert_eq!(to_xyz(p.u, p.v, torus.major_radius, torus.minor_radius), q);
    }
}

#[test]
fn engine_tracks_dirty_state_across_operations() {
    let mut engine = engine_with_seed(3);
    let first = engine.recompute().expect("evaluate").comparison.clone();
    assert!(!engine.is_dirty());

    engine.set_horizon(TimeHorizon::Twelve);
    assert!(!engine.is_dirty());

    engine.apply_preset("aggressive_reversal").expect("preset");
    let strong = engine.recompute().expect("evaluate").clone();
    assert_ne!(strong.comparison, first);
    assert!((strong.shaping.step_factor - 0.3).abs() < 1e-12);
    let raw_acceleration_delta =
        strong.metrics.intervention.acceleration - strong.metrics.status_quo.acceleration;
    let expected = TrajectoryStatus::classify(strong.comparison.velocity_delta, raw_acceleration_delta);
    assert_eq!(strong.comparison.status, expected);
    assert_eq!(strong.comparison.status_label, expected.label());
    assert_eq!(
        strong.comparison.velocity_delta,
        strong.metrics.intervention.velocity - strong.metrics.status_quo.velocity
    );

    engine.reset_interventions();
    assert!(engine.is_dirty());
    assert!(engine.interventions().is_neutral());
}
