use std::f64::consts::{PI, TAU};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::geom::{ParamPoint, TorusSurface};
use crate::trajectory::intervention::{
    InterventionConfig, InterventionError, InterventionVector, PathShaping, Slider, compute_path,
    curvature_factor, derive_seed, fnv1a32, intervention_score, step_factor,
};
use crate::trajectory::sampler::{WalkProfile, random_walk, status_quo_path};

fn start() -> ParamPoint {
    ParamPoint::new(1.5, 0.8)
}

#[test]
fn fnv_matches_reference_values() {
    assert_eq!(fnv1a32(b""), 0x811c_9dc5);
    assert_eq!(fnv1a32(b"a"), 0xe40c_292c);
}

#[test]
fn seed_key_formats_active_sliders_only() {
    assert_eq!(InterventionVector::NEUTRAL.seed_key(), "0.0_0.0_0.0_0.0_");
    let vector = InterventionVector::new(1.5, 10.0, 30.0, 100.0, 1200.0, 500.0);
    assert_eq!(vector.seed_key(), "1.5_10.0_30.0_100.0_");
}

#[test]
fn seed_changes_with_shaping_sliders_only() {
    let base = InterventionVector::new(1.0, 10.0, 30.0, 100.0, 0.0, 0.0);
    let seed = derive_seed(44, &base);
    assert_eq!(seed, derive_seed(44, &base));

    for slider in [
        Slider::SleepChange,
        Slider::Vo2maxChange,
        Slider::AlcoholReduction,
        Slider::CaffeineReduction,
    ] {
        let mut changed = base;
        changed.set(slider, base.get(slider) + slider.spec().step);
        assert_ne!(derive_seed(44, &changed), seed, "{slider}");
    }

    let mut nac = base;
    nac.nac_dose = 1200.0;
    assert_eq!(derive_seed(44, &nac), seed);
}

#[test]
fn seed_addition_wraps() {
    let vector = InterventionVector::NEUTRAL;
    let hash = fnv1a32(vector.seed_key().as_bytes());
    assert_eq!(derive_seed(u32::MAX, &vector), hash.wrapping_sub(1));
}

#[test]
fn neutral_vector_has_unit_factors() {
    let config = InterventionConfig::default();
    let shaping = PathShaping::derive(&InterventionVector::NEUTRAL, &config);
    assert_eq!(shaping.score, 0.0);
    assert_eq!(shaping.step_factor, 1.0);
    assert_eq!(shaping.curvature_factor, 1.0);
}

#[test]
fn neutral_walk_uses_status_quo_step_ranges() {
    let config = InterventionConfig::default();
    let shaping = PathShaping::derive(&InterventionVector::NEUTRAL, &config);
    let profile = WalkProfile::STATUS_QUO;
    let mut rng = StdRng::seed_from_u64(u64::from(shaping.seed));
    let (u, v) = random_walk(&mut rng, start(), 2000, &profile, Some(shaping.step_shaping()));

    let step = |from: f64, to: f64| {
        let d = (to - from).rem_euclid(TAU);
        if d > PI { d - TAU } else { d }
    };
    for i in 1..u.len() {
        let du = step(u[i - 1], u[i]);
        let dv = step(v[i - 1], v[i]);
        assert!(du >= profile.du.min - 1e-9 && du < profile.du.max + 1e-9, "du={du}");
        assert!(dv >= profile.dv.min - 1e-9 && dv < profile.dv.max + 1e-9, "dv={dv}");
    }
}

#[test]
fn caffeine_rotates_steps_out_of_status_quo_ranges() {
    let config = InterventionConfig::default();
    let mut vector = InterventionVector::NEUTRAL;
    vector.caffeine_reduction = 400.0;
    let shaping = PathShaping::derive(&vector, &config);
    assert!((shaping.step_factor - 0.928).abs() < 1e-12);
    assert!((shaping.curvature_factor - 1.3).abs() < 1e-12);

    let mut rng = StdRng::seed_from_u64(5);
    let (u, _) = random_walk(
        &mut rng,
        start(),
        200,
        &WalkProfile::STATUS_QUO,
        Some(shaping.step_shaping()),
    );
    let rotated = u
        .windows(2)
        .filter(|w| {
            let d = (w[1] - w[0]).rem_euclid(TAU);
            let du = if d > PI { d - TAU } else { d };
            du < WalkProfile::STATUS_QUO.du.min * shaping.step_factor - 1e-9
        })
        .count();
    assert!(rotated > 0);
}

#[test]
fn step_factor_shrinks_and_is_floored() {
    let config = InterventionConfig::default();
    let minimal = InterventionVector::new(1.0, 10.0, 30.0, 100.0, 0.0, 0.0);
    let score = intervention_score(&minimal, &config);
    assert!((score - 0.29).abs() < 1e-12);
    assert!((step_factor(score, &config) - 0.826).abs() < 1e-12);

    let aggressive = InterventionVector::new(3.0, 45.0, 100.0, 400.0, 1800.0, 1500.0);
    let score = intervention_score(&aggressive, &config);
    assert!((score - 1.69).abs() < 1e-12);
    assert_eq!(step_factor(score, &config), 0.3);
    assert!((curvature_factor(&aggressive, &config) - 1.3).abs() < 1e-12);
}

#[test]
fn compute_path_is_deterministic_per_vector() {
    let torus = TorusSurface::default();
    let config = InterventionConfig::default();
    let vector = InterventionVector::new(2.0, 25.0, 70.0, 250.0, 1200.0, 500.0);

    let (a, shaping_a) = compute_path(start(), 12, &vector, &config, &torus).unwrap();
    let (b, shaping_b) = compute_path(start(), 12, &vector, &config, &torus).unwrap();
    assert_eq!(a, b);
    assert_eq!(shaping_a, shaping_b);
    assert_eq!(a.len(), 150);

    let mut changed = vector;
    changed.sleep_change = 2.5;
    let (c, _) = compute_path(start(), 12, &changed, &config, &torus).unwrap();
    assert_ne!(a, c);
}

#[test]
fn intervention_path_starts_at_current_position() {
    let torus = TorusSurface::default();
    let config = InterventionConfig::default();
    let (path, _) = compute_path(start(), 3, &InterventionVector::NEUTRAL, &config, &torus).unwrap();
    let status_quo = status_quo_path(start(), 3, 43, &torus).unwrap();
    assert_eq!(path.len(), status_quo.len());
    assert_eq!(path.param(0), status_quo.param(0));
}

#[test]
fn from_map_requires_active_sliders() {
    let vector = InterventionVector::from_map([
        ("sleep_change", 1.0),
        ("vo2max_change", 10.0),
        ("alcohol_reduction", 30.0),
        ("caffeine_reduction", 100.0),
    ])
    .unwrap();
    assert_eq!(vector.nac_dose, 0.0);
    assert_eq!(vector.alcohol_reduction, 30.0);

    let missing = InterventionVector::from_map([("sleep_change", 1.0), ("vo2max_change", 10.0)]);
    assert_eq!(
        missing,
        Err(InterventionError::MissingSlider(Slider::AlcoholReduction))
    );
}

#[test]
fn from_map_rejects_unknown_and_non_finite() {
    let err = InterventionVector::from_map([("alcohol_reducton", 30.0)]).unwrap_err();
    assert_eq!(
        err,
        InterventionError::UnknownSlider {
            key: "alcohol_reducton".to_owned(),
            suggestion: Some("alcohol_reduction"),
        }
    );
    assert_eq!(
        err.to_string(),
        "unknown slider `alcohol_reducton` (did you mean `alcohol_reduction`?)"
    );

    let err = InterventionVector::from_map([("sleep_change", f64::NAN)]).unwrap_err();
    assert!(matches!(
        err,
        InterventionError::NonFinite {
            slider: Slider::SleepChange,
            ..
        }
    ));
}

#[test]
fn slider_values_snap_to_grid() {
    let sleep = Slider::SleepChange.spec();
    assert_eq!(sleep.clamp_and_snap(4.3), 4.0);
    assert_eq!(sleep.clamp_and_snap(-5.0), -2.0);
    assert_eq!(sleep.clamp_and_snap(0.74), 0.5);
    assert_eq!(sleep.clamp_and_snap(0.76), 1.0);
    assert_eq!(Slider::CaffeineReduction.spec().clamp_and_snap(120.0), 100.0);
    assert_eq!(Slider::from_key("nac_dose"), Some(Slider::NacDose));
    assert_eq!(Slider::suggest("vo2max_chang"), Some("vo2max_change"));
}
