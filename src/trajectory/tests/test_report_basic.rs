use crate::geom::TorusSurface;
use crate::trajectory::coupling::{CouplingConfig, couple};
use crate::trajectory::intervention::{InterventionVector, Slider};
use crate::trajectory::metrics::Metrics;
use crate::trajectory::path::Path;
use crate::trajectory::report::{
    ComparisonInputs, ReportSummarizer, SummaryError, TemplateSummarizer, TrajectoryStatus,
    active_summary, build_comparison, percent_change, summarize_or_message, top_factors,
};

fn metrics(velocity: f64, acceleration: f64, uncertainty: f64) -> Metrics {
    Metrics {
        velocity,
        acceleration,
        uncertainty,
    }
}

#[test]
fn status_thresholds_are_checked_in_order() {
    assert_eq!(TrajectoryStatus::classify(-0.2, -0.1), TrajectoryStatus::Improving);
    assert_eq!(TrajectoryStatus::classify(-0.2, 0.1), TrajectoryStatus::VelocityImproving);
    assert_eq!(TrajectoryStatus::classify(0.3, -0.1), TrajectoryStatus::MinimalChange);
    assert_eq!(TrajectoryStatus::classify(0.0, 0.0), TrajectoryStatus::MinimalChange);
    assert_eq!(TrajectoryStatus::classify(0.5, 0.3), TrajectoryStatus::RequiresReview);
    assert_eq!(TrajectoryStatus::MinimalChange.label(), "minimal change");
    assert_eq!(TrajectoryStatus::RequiresReview.label(), "requires review");
}

#[test]
fn percent_change_guards_zero_reference() {
    assert_eq!(percent_change(1.0, 0.0), 0.0);
    assert!((percent_change(-0.2, 1.0) + 20.0).abs() < 1e-12);
}

#[test]
fn top_factors_rank_positive_sliders() {
    let minimal = InterventionVector::new(1.0, 10.0, 30.0, 100.0, 0.0, 0.0);
    let ranked: Vec<Slider> = top_factors(&minimal, 3).iter().map(|f| f.slider).collect();
    assert_eq!(
        ranked,
        [Slider::AlcoholReduction, Slider::Vo2maxChange, Slider::CaffeineReduction]
    );

    let sleep_loss = InterventionVector::new(-1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    assert!(top_factors(&sleep_loss, 3).is_empty());
}

#[test]
fn active_summary_lists_non_zero_sliders() {
    assert_eq!(active_summary(&InterventionVector::NEUTRAL), "No interventions applied");
    let vector = InterventionVector::new(0.0, 0.0, 30.0, 0.0, 0.0, 500.0);
    assert_eq!(
        active_summary(&vector),
        "Alcohol Reduction (%): 30, Metformin (mg/day): 500"
    );
}

#[test]
fn comparison_record_combines_metrics() {
    let torus = TorusSurface::default();
    let healthy_path = Path::from_params(vec![0.0, 0.1, 0.2], vec![0.0, 0.0, 0.0], &torus);
    let intervention_path = Path::from_params(vec![1.5, 1.6], vec![0.8, 0.9], &torus);

    let sq = metrics(1.0, 0.01, 0.2);
    let healthy = metrics(0.5, 0.005, 0.1);
    let raw = metrics(0.8, 0.015, 0.25);
    let coupled = couple(&sq, &raw, &CouplingConfig::default());
    let vector = InterventionVector::new(2.0, 25.0, 70.0, 250.0, 1200.0, 500.0);

    let record = build_comparison(&ComparisonInputs {
        status_quo: &sq,
        healthy: &healthy,
        intervention: &raw,
        coupled: &coupled,
        interventions: &vector,
        intervention_path: &intervention_path,
        healthy_path: &healthy_path,
    });

    assert!((record.intervention.acceleration + 0.09).abs() < 1e-12);
    assert_eq!(record.intervention.velocity, 0.8);
    assert!((record.velocity_change_pct + 20.0).abs() < 1e-9);
    assert!((record.acceleration_change_pct + 1000.0).abs() < 1e-6);
    assert!((record.uncertainty_delta - 0.05).abs() < 1e-12);
    // Coupling flips the displayed acceleration delta; the status keeps the raw sign.
    assert!(record.acceleration_delta < 0.0);
    assert_eq!(record.status, TrajectoryStatus::VelocityImproving);
    assert_eq!(record.status_label, "slowing (velocity reduced)");
    assert!((record.deviation_from_healthy_pct - 100.0).abs() < 1e-9);
    assert!((record.intervention_deviation_from_healthy_pct - 60.0).abs() < 1e-9);
    assert!((record.time_dilation_pct - 80.0).abs() < 1e-9);
    assert!((record.months_to_healthy.unwrap() - 2.5).abs() < 1e-9);
    assert_eq!(record.top_factors.len(), 3);
    assert!(record.any_intervention);

    let current = intervention_path.position(0).unwrap();
    let expected_gap = healthy_path.nearest_distance(current).unwrap() * 5.0;
    assert!((record.biological_age_gap_years - expected_gap).abs() < 1e-12);
}

#[test]
fn no_improvement_has_no_time_to_healthy() {
    let torus = TorusSurface::default();
    let path = Path::from_params(vec![0.0], vec![0.0], &torus);
    let sq = metrics(1.0, 0.01, 0.2);
    let raw = metrics(1.2, 0.02, 0.2);
    let coupled = couple(&sq, &raw, &CouplingConfig::default());
    let record = build_comparison(&ComparisonInputs {
        status_quo: &sq,
        healthy: &metrics(0.5, 0.005, 0.1),
        intervention: &raw,
        coupled: &coupled,
        interventions: &InterventionVector::NEUTRAL,
        intervention_path: &path,
        healthy_path: &path,
    });
    assert_eq!(record.months_to_healthy, None);
    assert_eq!(record.status, TrajectoryStatus::MinimalChange);
    assert_eq!(record.biological_age_gap_years, 0.0);
    assert!(!record.any_intervention);
}

#[test]
fn status_follows_raw_acceleration_sign() {
    let torus = TorusSurface::default();
    let path = Path::from_params(vec![0.0, 0.1], vec![0.0, 0.1], &torus);
    let sq = metrics(1.0, 0.01, 0.2);
    let healthy = metrics(0.5, 0.005, 0.1);
    let record_for = |raw: &Metrics| {
        let coupled = couple(&sq, raw, &CouplingConfig::default());
        build_comparison(&ComparisonInputs {
            status_quo: &sq,
            healthy: &healthy,
            intervention: raw,
            coupled: &coupled,
            interventions: &InterventionVector::NEUTRAL,
            intervention_path: &path,
            healthy_path: &path,
        })
    };

    assert_eq!(record_for(&metrics(0.8, 0.004, 0.2)).status, TrajectoryStatus::Improving);
    assert_eq!(
        record_for(&metrics(0.8, 0.02, 0.2)).status,
        TrajectoryStatus::VelocityImproving
    );
    assert_eq!(record_for(&metrics(1.0, 0.02, 0.2)).status, TrajectoryStatus::MinimalChange);
    assert_eq!(record_for(&metrics(1.6, 0.02, 0.2)).status, TrajectoryStatus::RequiresReview);
}

struct OfflineBackend;

impl ReportSummarizer for OfflineBackend {
    fn summarize(&self, _: &crate::trajectory::report::ComparisonRecord) -> Result<String, SummaryError> {
        Err(SummaryError::MissingCredentials)
    }
}

#[test]
fn summarizer_failures_become_display_text() {
    let torus = TorusSurface::default();
    let path = Path::from_params(vec![0.0, 0.1], vec![0.0, 0.1], &torus);
    let sq = metrics(1.0, 0.01, 0.2);
    let raw = metrics(0.8, 0.015, 0.25);
    let coupled = couple(&sq, &raw, &CouplingConfig::default());
    let record = build_comparison(&ComparisonInputs {
        status_quo: &sq,
        healthy: &metrics(0.5, 0.005, 0.1),
        intervention: &raw,
        coupled: &coupled,
        interventions: &InterventionVector::NEUTRAL,
        intervention_path: &path,
        healthy_path: &path,
    });

    let text = summarize_or_message(&TemplateSummarizer, &record);
    assert!(text.contains("Trajectory status: slowing"));
    assert!(text.contains("No interventions applied"));

    let fallback = summarize_or_message(&OfflineBackend, &record);
    assert_eq!(fallback, SummaryError::MissingCredentials.display_message());
}
