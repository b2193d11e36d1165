//! Comparison record handed to reporting collaborators, and the summarizer
//! seam they plug into.

use std::fmt::Write as _;

use serde::Serialize;

use super::coupling::CoupledDelta;
use super::intervention::{InterventionVector, Slider};
use super::metrics::Metrics;
use super::path::Path;

/// Years of biological age per unit of 3-D distance to the healthy path.
pub const BIO_AGE_YEARS_PER_UNIT: f64 = 5.0;

/// Velocity |delta| below which a change counts as minimal.
pub const MINIMAL_CHANGE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryStatus {
    /// Velocity and acceleration both decreased.
    Improving,
    /// Only velocity decreased.
    VelocityImproving,
    MinimalChange,
    RequiresReview,
}

impl TrajectoryStatus {
    /// Checked in order: both deltas negative, velocity negative,
    /// `|dv| < 0.5`, anything else.
    #[must_use]
    pub fn classify(velocity_delta: f64, acceleration_delta: f64) -> Self {
        if velocity_delta < 0.0 && acceleration_delta < 0.0 {
            Self::Improving
        } else if velocity_delta < 0.0 {
            Self::VelocityImproving
        } else if velocity_delta.abs() < MINIMAL_CHANGE_THRESHOLD {
            Self::MinimalChange
        } else {
            Self::RequiresReview
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Improving => "improving (velocity and acceleration reduced)",
            Self::VelocityImproving => "slowing (velocity reduced)",
            Self::MinimalChange => "minimal change",
            Self::RequiresReview => "requires review",
        }
    }
}

/// `100 · delta / reference`, or `0` when the reference is zero.
#[must_use]
pub fn percent_change(delta: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        0.0
    } else {
        100.0 * delta / reference
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorImpact {
    pub slider: Slider,
    pub label: &'static str,
    pub impact: f64,
}

const fn impact_weight(slider: Slider) -> (&'static str, f64) {
    match slider {
        Slider::AlcoholReduction => ("Alcohol reduction", 0.015),
        Slider::Vo2maxChange => ("VO2max improvement", 0.012),
        Slider::SleepChange => ("Sleep increase", 0.008),
        Slider::CaffeineReduction => ("Caffeine reduction", 0.0002),
        Slider::NacDose => ("NAC supplementation", 0.0003),
        Slider::MetforminDose => ("Metformin", 0.0004),
    }
}

/// Positive sliders ranked by estimated velocity impact, largest first.
/// Ties keep the alcohol, VO2max, sleep, caffeine, NAC, metformin order.
#[must_use]
pub fn top_factors(vector: &InterventionVector, limit: usize) -> Vec<FactorImpact> {
    const RANK_ORDER: [Slider; 6] = [
        Slider::AlcoholReduction,
        Slider::Vo2maxChange,
        Slider::SleepChange,
        Slider::CaffeineReduction,
        Slider::NacDose,
        Slider::MetforminDose,
    ];

    let mut impacts: Vec<FactorImpact> = RANK_ORDER
        .into_iter()
        .filter(|slider| vector.get(*slider) > 0.0)
        .map(|slider| {
            let (label, weight) = impact_weight(slider);
            FactorImpact {
                slider,
                label,
                impact: vector.get(slider) * weight,
            }
        })
        .collect();
    impacts.sort_by(|a, b| b.impact.total_cmp(&a.impact));
    impacts.truncate(limit);
    impacts
}

/// `"label: value"` for every non-zero slider, or a neutral notice.
#[must_use]
pub fn active_summary(vector: &InterventionVector) -> String {
    let parts: Vec<String> = vector
        .active()
        .map(|(slider, value)| format!("{}: {value}", slider.label()))
        .collect();
    if parts.is_empty() {
        "No interventions applied".to_owned()
    } else {
        parts.join(", ")
    }
}

/// Flat record combining the three metric sets and everything derived from
/// them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRecord {
    pub status_quo: Metrics,
    pub healthy: Metrics,
    /// Intervention metrics as displayed, i.e. with the coupled acceleration.
    pub intervention: Metrics,
    pub velocity_delta: f64,
    pub acceleration_delta: f64,
    pub uncertainty_delta: f64,
    pub velocity_change_pct: f64,
    pub acceleration_change_pct: f64,
    /// Classified on the velocity delta and the uncoupled acceleration delta.
    pub status: TrajectoryStatus,
    pub status_label: &'static str,
    pub deviation_from_healthy_pct: f64,
    pub intervention_deviation_from_healthy_pct: f64,
    /// Intervention velocity relative to status quo, in percent.
    pub time_dilation_pct: f64,
    /// `None` when the intervention does not slow the trajectory.
    pub months_to_healthy: Option<f64>,
    pub top_factors: Vec<FactorImpact>,
    pub biological_age_gap_years: f64,
    pub any_intervention: bool,
    pub active_summary: String,
}

pub struct ComparisonInputs<'a> {
    pub status_quo: &'a Metrics,
    pub healthy: &'a Metrics,
    /// Raw metrics of the intervention path, before coupling.
    pub intervention: &'a Metrics,
    pub coupled: &'a CoupledDelta,
    pub interventions: &'a InterventionVector,
    pub intervention_path: &'a Path,
    pub healthy_path: &'a Path,
}

#[must_use]
pub fn build_comparison(inputs: &ComparisonInputs<'_>) -> ComparisonRecord {
    let sq = inputs.status_quo;
    let healthy = inputs.healthy;
    let coupled = inputs.coupled;
    let displayed = Metrics {
        velocity: inputs.intervention.velocity,
        acceleration: coupled.acceleration,
        uncertainty: inputs.intervention.uncertainty,
    };

    let raw_acceleration_delta = inputs.intervention.acceleration - sq.acceleration;
    let status = TrajectoryStatus::classify(coupled.velocity_delta, raw_acceleration_delta);
    let deviation =
        |m: &Metrics| percent_change((m.velocity - healthy.velocity).abs(), healthy.velocity);

    let improvement = sq.velocity - displayed.velocity;
    let months_to_healthy =
        (improvement > 0.0).then(|| (sq.velocity - healthy.velocity) / improvement);

    let biological_age_gap_years = inputs
        .intervention_path
        .position(0)
        .and_then(|current| inputs.healthy_path.nearest_distance(current))
        .map_or(0.0, |distance| distance * BIO_AGE_YEARS_PER_UNIT);

    ComparisonRecord {
        status_quo: *sq,
        healthy: *healthy,
        intervention: displayed,
        velocity_delta: coupled.velocity_delta,
        acceleration_delta: coupled.acceleration_delta,
        uncertainty_delta: displayed.uncertainty - sq.uncertainty,
        velocity_change_pct: percent_change(coupled.velocity_delta, sq.velocity),
        acceleration_change_pct: percent_change(coupled.acceleration_delta, sq.acceleration),
        status,
        status_label: status.label(),
        deviation_from_healthy_pct: deviation(sq),
        intervention_deviation_from_healthy_pct: deviation(&displayed),
        time_dilation_pct: percent_change(displayed.velocity, sq.velocity),
        months_to_healthy,
        top_factors: top_factors(inputs.interventions, 3),
        biological_age_gap_years,
        any_intervention: !inputs.interventions.is_neutral(),
        active_summary: active_summary(inputs.interventions),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummaryError {
    #[error("summary backend credentials are missing")]
    MissingCredentials,
    #[error("summary backend unreachable: {0}")]
    Network(String),
    #[error("summary backend `{0}` is not supported")]
    UnsupportedBackend(String),
}

impl SummaryError {
    /// Short message suitable for showing in place of the summary.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::MissingCredentials => {
                "Report unavailable: no credentials configured for the summary service.".to_owned()
            }
            Self::Network(detail) => format!("Report unavailable: network error ({detail})."),
            Self::UnsupportedBackend(name) => {
                format!("Report unavailable: backend `{name}` is not supported.")
            }
        }
    }
}

/// Turns a comparison record into human-readable text.
pub trait ReportSummarizer {
    fn summarize(&self, record: &ComparisonRecord) -> Result<String, SummaryError>;
}

/// Offline summarizer with a fixed template.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSummarizer;

impl ReportSummarizer for TemplateSummarizer {
    fn summarize(&self, record: &ComparisonRecord) -> Result<String, SummaryError> {
        let mut out = String::new();
        let _ = writeln!(out, "Interventions: {}", record.active_summary);
        let _ = writeln!(
            out,
            "Velocity {:.3} -> {:.3} ({:+.1}%), acceleration {:.3} -> {:.3} ({:+.1}%)",
            record.status_quo.velocity,
            record.intervention.velocity,
            record.velocity_change_pct,
            record.status_quo.acceleration,
            record.intervention.acceleration,
            record.acceleration_change_pct,
        );
        let _ = writeln!(out, "Trajectory status: {}", record.status_label);
        let _ = writeln!(
            out,
            "Deviation from healthy: {:.1}% -> {:.1}%",
            record.deviation_from_healthy_pct, record.intervention_deviation_from_healthy_pct
        );
        match record.months_to_healthy {
            Some(months) => {
                let _ = writeln!(out, "Estimated time to healthy trajectory: ~{months:.1} months");
            }
            None => {
                let _ = writeln!(out, "Current interventions show minimal effect.");
            }
        }
        for (rank, factor) in record.top_factors.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {}: {:.3} velocity reduction",
                rank + 1,
                factor.label,
                factor.impact
            );
        }
        let _ = write!(
            out,
            "Biological age gap: {:.1} years",
            record.biological_age_gap_years
        );
        Ok(out)
    }
}

/// Runs `summarizer`, replacing any failure with its display message.
#[must_use]
pub fn summarize_or_message(summarizer: &dyn ReportSummarizer, record: &ComparisonRecord) -> String {
    match summarizer.summarize(record) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("summary failed: {err}");
            err.display_message()
        }
    }
}
