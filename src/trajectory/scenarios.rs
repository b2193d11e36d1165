//! Named intervention presets and multi-phase timelines.

use serde::Serialize;

use super::intervention::InterventionVector;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scenario {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub interventions: InterventionVector,
    pub expected_improvement: &'static str,
    pub difficulty: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelinePhase {
    pub period: &'static str,
    pub focus: &'static str,
    pub interventions: InterventionVector,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Timeline {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub horizon_months: u32,
    pub phases: &'static [TimelinePhase],
}

impl Timeline {
    /// The interventions in effect at the end of the timeline.
    #[must_use]
    pub fn final_interventions(&self) -> InterventionVector {
        self.phases
            .last()
            .map_or(InterventionVector::NEUTRAL, |phase| phase.interventions)
    }
}

const fn iv(sleep: f64, vo2: f64, alcohol: f64, caffeine: f64, nac: f64, metformin: f64) -> InterventionVector {
    InterventionVector::new(sleep, vo2, alcohol, caffeine, nac, metformin)
}

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        id: "minimal_lifestyle",
        name: "Minimal Lifestyle Changes",
        description: "Achievable changes for patients resistant to major interventions",
        interventions: iv(1.0, 10.0, 30.0, 100.0, 0.0, 0.0),
        expected_improvement: "15-25% velocity reduction",
        difficulty: "Low",
    },
    Scenario {
        id: "moderate_comprehensive",
        name: "Moderate Comprehensive Plan",
        description: "Balanced approach combining lifestyle and supplementation",
        interventions: iv(2.0, 25.0, 70.0, 250.0, 1200.0, 500.0),
        expected_improvement: "40-55% velocity reduction",
        difficulty: "Moderate",
    },
    Scenario {
        id: "aggressive_reversal",
        name: "Aggressive Reversal Protocol",
        description: "Maximum intervention for motivated patients with high risk",
        interventions: iv(3.0, 45.0, 100.0, 400.0, 1800.0, 1500.0),
        expected_improvement: "60-75% velocity reduction",
        difficulty: "High",
    },
    Scenario {
        id: "alcohol_focused",
        name: "Alcohol Reduction Focus",
        description: "Primarily targeting alcohol-related liver damage",
        interventions: iv(1.5, 15.0, 90.0, 150.0, 1600.0, 0.0),
        expected_improvement: "50-60% velocity reduction (liver-specific)",
        difficulty: "High (alcohol cessation)",
    },
    Scenario {
        id: "metabolic_optimization",
        name: "Metabolic Optimization",
        description: "Targeting metabolic dysfunction and insulin resistance",
        interventions: iv(2.0, 35.0, 50.0, 200.0, 600.0, 1500.0),
        expected_improvement: "45-55% velocity reduction (metabolic axis)",
        difficulty: "Moderate",
    },
    Scenario {
        id: "antioxidant_boost",
        name: "Antioxidant & Recovery",
        description: "Focusing on oxidative stress reduction and recovery",
        interventions: iv(2.5, 20.0, 80.0, 300.0, 2000.0, 500.0),
        expected_improvement: "40-50% velocity reduction (oxidative axis)",
        difficulty: "Moderate",
    },
];

pub const TIMELINES: &[Timeline] = &[
    Timeline {
        id: "3_month_intensive",
        name: "3-Month Intensive Start",
        description: "Rapid intervention to demonstrate results and build momentum",
        horizon_months: 3,
        phases: &[
            TimelinePhase {
                period: "Weeks 1-4",
                focus: "Alcohol reduction, sleep improvement, NAC supplementation",
                interventions: iv(2.0, 10.0, 80.0, 200.0, 1600.0, 0.0),
            },
            TimelinePhase {
                period: "Weeks 5-12",
                focus: "Add exercise, optimize supplements, maintain alcohol reduction",
                interventions: iv(2.5, 30.0, 90.0, 250.0, 1600.0, 1000.0),
            },
        ],
    },
    Timeline {
        id: "6_month_sustainable",
        name: "6-Month Sustainable Build",
        description: "Gradual escalation for long-term adherence",
        horizon_months: 6,
        phases: &[
            TimelinePhase {
                period: "Months 1-2",
                focus: "Sleep and basic lifestyle",
                interventions: iv(1.5, 15.0, 50.0, 150.0, 600.0, 0.0),
            },
            TimelinePhase {
                period: "Months 3-4",
                focus: "Increase exercise, reduce substances",
                interventions: iv(2.0, 25.0, 75.0, 250.0, 1200.0, 500.0),
            },
            TimelinePhase {
                period: "Months 5-6",
                focus: "Optimize all parameters",
                interventions: iv(2.5, 35.0, 90.0, 300.0, 1600.0, 1000.0),
            },
        ],
    },
    Timeline {
        id: "12_month_transformation",
        name: "12-Month Complete Transformation",
        description: "Comprehensive year-long protocol for complete trajectory reversal",
        horizon_months: 12,
        phases: &[
            TimelinePhase {
                period: "Months 1-3",
                focus: "Foundation building",
                interventions: iv(1.5, 15.0, 60.0, 200.0, 800.0, 0.0),
            },
            TimelinePhase {
                period: "Months 4-6",
                focus: "Intensification",
                interventions: iv(2.0, 30.0, 80.0, 300.0, 1400.0, 1000.0),
            },
            TimelinePhase {
                period: "Months 7-9",
                focus: "Optimization",
                interventions: iv(2.5, 40.0, 95.0, 350.0, 1800.0, 1500.0),
            },
            TimelinePhase {
                period: "Months 10-12",
                focus: "Maintenance and fine-tuning",
                interventions: iv(2.5, 45.0, 100.0, 400.0, 1600.0, 1500.0),
            },
        ],
    },
];

#[must_use]
pub fn scenario(id: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|scenario| scenario.id == id)
}

#[must_use]
pub fn timeline(id: &str) -> Option<&'static Timeline> {
    TIMELINES.iter().find(|timeline| timeline.id == id)
}

/// A resolved preset: the interventions to apply and, for timelines, the
/// horizon they were written for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub interventions: InterventionVector,
    pub horizon_months: Option<u32>,
}

/// Resolves `neutral`, a scenario id, `timeline:<id>` (final phase) or
/// `timeline:<id>#<n>` (1-based phase). Intervention values are snapped onto
/// the slider grid.
#[must_use]
pub fn resolve_preset(name: &str) -> Option<Preset> {
    let mut preset = lookup_preset(name)?;
    preset.interventions = preset.interventions.snapped();
    Some(preset)
}

fn lookup_preset(name: &str) -> Option<Preset> {
    let name = name.trim();
    if name.eq_ignore_ascii_case("neutral") {
        return Some(Preset {
            interventions: InterventionVector::NEUTRAL,
            horizon_months: None,
        });
    }
    if let Some(rest) = name.strip_prefix("timeline:") {
        let (id, phase) = match rest.split_once('#') {
            Some((id, phase)) => (id, Some(phase.parse::<usize>().ok()?)),
            None => (rest, None),
        };
        let timeline = timeline(id)?;
        let interventions = match phase {
            Some(index) => timeline.phases.get(index.checked_sub(1)?)?.interventions,
            None => timeline.final_interventions(),
        };
        return Some(Preset {
            interventions,
            horizon_months: Some(timeline.horizon_months),
        });
    }
    scenario(name).map(|scenario| Preset {
        interventions: scenario.interventions,
        horizon_months: None,
    })
}
