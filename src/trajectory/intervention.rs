//! Mapping from intervention slider magnitudes to walk shaping.
//!
//! An [`InterventionVector`] drives three pure functions: the generation seed
//! (stable hash of the formatted active sliders), the intervention score (a
//! weighted sum of all sliders) and the curvature factor (caffeine only).
//! [`compute_path`] combines them into one seeded, shaped forecast.

use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::path::Path;
use super::sampler::{StepShaping, WalkProfile, control_count, random_walk, sample_count, spline_path};
use crate::geom::{ParamPoint, SplineError, TorusSurface};

/// The six intervention sliders, in their fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slider {
    SleepChange,
    Vo2maxChange,
    AlcoholReduction,
    CaffeineReduction,
    NacDose,
    MetforminDose,
}

/// Range and step grid of a slider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SliderSpec {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl SliderSpec {
    /// Clamps `value` to `[min, max]` and snaps it onto the step grid
    /// anchored at `min`.
    #[must_use]
    pub fn clamp_and_snap(self, value: f64) -> f64 {
        let clamped = value.max(self.min).min(self.max);
        if self.step > 0.0 {
            let snapped = self.min + ((clamped - self.min) / self.step).round() * self.step;
            snapped.max(self.min).min(self.max)
        } else {
            clamped
        }
    }
}

impl Slider {
    pub const ALL: [Slider; 6] = [
        Slider::SleepChange,
        Slider::Vo2maxChange,
        Slider::AlcoholReduction,
        Slider::CaffeineReduction,
        Slider::NacDose,
        Slider::MetforminDose,
    ];

    /// Map key used in slider dictionaries and the seed string.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Slider::SleepChange => "sleep_change",
            Slider::Vo2maxChange => "vo2max_change",
            Slider::AlcoholReduction => "alcohol_reduction",
            Slider::CaffeineReduction => "caffeine_reduction",
            Slider::NacDose => "nac_dose",
            Slider::MetforminDose => "metformin_dose",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Slider::SleepChange => "Sleep Duration Change (hours/night)",
            Slider::Vo2maxChange => "VO2max Improvement (%)",
            Slider::AlcoholReduction => "Alcohol Reduction (%)",
            Slider::CaffeineReduction => "Caffeine Reduction (mg/day)",
            Slider::NacDose => "N-Acetylcysteine (mg/day)",
            Slider::MetforminDose => "Metformin (mg/day)",
        }
    }

    #[must_use]
    pub const fn spec(self) -> SliderSpec {
        let (min, max, step) = match self {
            Slider::SleepChange => (-2.0, 4.0, 0.5),
            Slider::Vo2maxChange => (0.0, 50.0, 5.0),
            Slider::AlcoholReduction => (0.0, 100.0, 10.0),
            Slider::CaffeineReduction => (0.0, 400.0, 50.0),
            Slider::NacDose => (0.0, 2000.0, 200.0),
            Slider::MetforminDose => (0.0, 2000.0, 500.0),
        };
        SliderSpec { min, max, step }
    }

    /// NAC and metformin no longer shape the path beyond their score weight
    /// and may be omitted from slider maps.
    #[must_use]
    pub const fn is_required(self) -> bool {
        !matches!(self, Slider::NacDose | Slider::MetforminDose)
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slider| slider.key() == key)
    }

    /// Closest known key within a small edit distance, for error messages.
    #[must_use]
    pub fn suggest(key: &str) -> Option<&'static str> {
        let key = key.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .map(|slider| (levenshtein::levenshtein(&key, slider.key()), slider.key()))
            .filter(|(distance, _)| *distance <= 3)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, name)| name)
    }
}

impl fmt::Display for Slider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InterventionError {
    #[error("required slider `{0}` is missing")]
    MissingSlider(Slider),
    #[error("unknown slider `{key}`{}", did_you_mean(.suggestion))]
    UnknownSlider {
        key: String,
        suggestion: Option<&'static str>,
    },
    #[error("slider `{slider}` has non-finite value {value}")]
    NonFinite { slider: Slider, value: f64 },
}

fn did_you_mean(suggestion: &Option<&'static str>) -> String {
    suggestion
        .map(|name| format!(" (did you mean `{name}`?)"))
        .unwrap_or_default()
}

/// Slider magnitudes for one recomputation. The zero vector is neutral.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterventionVector {
    pub sleep_change: f64,
    pub vo2max_change: f64,
    pub alcohol_reduction: f64,
    pub caffeine_reduction: f64,
    #[serde(default)]
    pub nac_dose: f64,
    #[serde(default)]
    pub metformin_dose: f64,
}

impl InterventionVector {
    pub const NEUTRAL: Self = Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(
        sleep_change: f64,
        vo2max_change: f64,
        alcohol_reduction: f64,
        caffeine_reduction: f64,
        nac_dose: f64,
        metformin_dose: f64,
    ) -> Self {
        Self {
            sleep_change,
            vo2max_change,
            alcohol_reduction,
            caffeine_reduction,
            nac_dose,
            metformin_dose,
        }
    }

    /// Builds a vector from `(key, value)` pairs. Every required slider must
    /// be present; unknown keys and non-finite values are rejected.
    pub fn from_map<'a>(
        entries: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Result<Self, InterventionError> {
        let mut vector = Self::NEUTRAL;
        let mut seen = [false; 6];

        for (key, value) in entries {
            let slider = Slider::from_key(key).ok_or_else(|| InterventionError::UnknownSlider {
                key: key.to_owned(),
                suggestion: Slider::suggest(key),
            })?;
            if !value.is_finite() {
                return Err(InterventionError::NonFinite { slider, value });
            }
            vector.set(slider, value);
            seen[slider as usize] = true;
        }

        if let Some(missing) = Slider::ALL
            .into_iter()
            .find(|slider| slider.is_required() && !seen[*slider as usize])
        {
            return Err(InterventionError::MissingSlider(missing));
        }

        Ok(vector)
    }

    #[must_use]
    pub const fn get(&self, slider: Slider) -> f64 {
        match slider {
            Slider::SleepChange => self.sleep_change,
            Slider::Vo2maxChange => self.vo2max_change,
            Slider::AlcoholReduction => self.alcohol_reduction,
            Slider::CaffeineReduction => self.caffeine_reduction,
            Slider::NacDose => self.nac_dose,
            Slider::MetforminDose => self.metformin_dose,
        }
    }

    pub fn set(&mut self, slider: Slider, value: f64) {
        let slot = match slider {
            Slider::SleepChange => &mut self.sleep_change,
            Slider::Vo2maxChange => &mut self.vo2max_change,
            Slider::AlcoholReduction => &mut self.alcohol_reduction,
            Slider::CaffeineReduction => &mut self.caffeine_reduction,
            Slider::NacDose => &mut self.nac_dose,
            Slider::MetforminDose => &mut self.metformin_dose,
        };
        *slot = value;
    }

    /// Every slider clamped to its range and snapped onto its step grid.
    #[must_use]
    pub fn snapped(&self) -> Self {
        let mut out = *self;
        for slider in Slider::ALL {
            out.set(slider, slider.spec().clamp_and_snap(self.get(slider)));
        }
        out
    }

    pub fn validate(&self) -> Result<(), InterventionError> {
        for slider in Slider::ALL {
            let value = self.get(slider);
            if !value.is_finite() {
                return Err(InterventionError::NonFinite { slider, value });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn is_neutral(&self) -> bool {
        Slider::ALL.into_iter().all(|slider| self.get(slider) == 0.0)
    }

    /// Non-zero sliders in fixed order.
    pub fn active(&self) -> impl Iterator<Item = (Slider, f64)> + '_ {
        Slider::ALL
            .into_iter()
            .map(|slider| (slider, self.get(slider)))
            .filter(|(_, value)| *value != 0.0)
    }

    /// Weighted sum of all six sliders.
    #[must_use]
    pub fn dot(&self, weights: &InterventionVector) -> f64 {
        Slider::ALL
            .into_iter()
            .map(|slider| self.get(slider) * weights.get(slider))
            .sum()
    }

    /// `"{sleep:.1}_{vo2max:.1}_{alcohol:.1}_{caffeine:.1}_"`. NAC and
    /// metformin are not part of the key.
    #[must_use]
    pub fn seed_key(&self) -> String {
        format!(
            "{:.1}_{:.1}_{:.1}_{:.1}_",
            self.sleep_change, self.vo2max_change, self.alcohol_reduction, self.caffeine_reduction
        )
    }

    /// Bitwise fingerprint of all six values, for cache keys.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hash = FNV64_OFFSET;
        for slider in Slider::ALL {
            for byte in self.get(slider).to_bits().to_le_bytes() {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(FNV64_PRIME);
            }
        }
        hash
    }
}

const FNV32_OFFSET: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;
const FNV64_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV64_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 32-bit FNV-1a.
#[must_use]
pub fn fnv1a32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV32_OFFSET, |hash, &byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV32_PRIME)
    })
}

/// `(base + hash(seed_key)) mod 2^32`.
#[must_use]
pub fn derive_seed(base_seed: u32, vector: &InterventionVector) -> u32 {
    base_seed.wrapping_add(fnv1a32(vector.seed_key().as_bytes()))
}

/// Calibrated constants of the intervention model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterventionConfig {
    pub base_seed: u32,
    /// Per-slider score weight.
    pub weights: InterventionVector,
    /// Step factor is `1 - score · damping` before clamping.
    pub damping: f64,
    pub min_step_factor: f64,
    pub max_step_factor: f64,
    /// Curvature factor is `1 + (caffeine / caffeine_reference) · curvature_gain`.
    pub curvature_gain: f64,
    pub caffeine_reference: f64,
}

impl Default for InterventionConfig {
    fn default() -> Self {
        Self {
            base_seed: 44,
            weights: InterventionVector::new(0.08, 0.006, 0.004, 0.0003, 0.0002, 0.0002),
            damping: 0.6,
            min_step_factor: 0.3,
            max_step_factor: 1.0,
            curvature_gain: 0.3,
            caffeine_reference: 400.0,
        }
    }
}

#[must_use]
pub fn intervention_score(vector: &InterventionVector, config: &InterventionConfig) -> f64 {
    vector.dot(&config.weights)
}

#[must_use]
pub fn step_factor(score: f64, config: &InterventionConfig) -> f64 {
    (1.0 - score * config.damping).clamp(config.min_step_factor, config.max_step_factor)
}

#[must_use]
pub fn curvature_factor(vector: &InterventionVector, config: &InterventionConfig) -> f64 {
    if config.caffeine_reference == 0.0 {
        return 1.0;
    }
    1.0 + (vector.caffeine_reduction / config.caffeine_reference) * config.curvature_gain
}

/// Everything derived from an intervention vector before the walk runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathShaping {
    pub seed: u32,
    pub score: f64,
    pub step_factor: f64,
    pub curvature_factor: f64,
}

impl PathShaping {
    #[must_use]
    pub fn derive(vector: &InterventionVector, config: &InterventionConfig) -> Self {
        let score = intervention_score(vector, config);
        Self {
            seed: derive_seed(config.base_seed, vector),
            score,
            step_factor: step_factor(score, config),
            curvature_factor: curvature_factor(vector, config),
        }
    }

    #[must_use]
    pub fn step_shaping(&self) -> StepShaping {
        StepShaping {
            step_factor: self.step_factor,
            curvature_factor: self.curvature_factor,
        }
    }
}

/// Shaped, seeded intervention forecast.
pub fn compute_path(
    start: ParamPoint,
    months: u32,
    vector: &InterventionVector,
    config: &InterventionConfig,
    surface: &TorusSurface,
) -> Result<(Path, PathShaping), SplineError> {
    let shaping = PathShaping::derive(vector, config);
    log::debug!(
        "intervention seed={} score={:.4} step={:.4} curvature={:.4}",
        shaping.seed,
        shaping.score,
        shaping.step_factor,
        shaping.curvature_factor
    );

    let mut rng = StdRng::seed_from_u64(u64::from(shaping.seed));
    let (u, v) = random_walk(
        &mut rng,
        start,
        control_count(months),
        &WalkProfile::STATUS_QUO,
        Some(shaping.step_shaping()),
    );
    let path = spline_path(&u, &v, sample_count(months), surface)?;
    Ok((path, shaping))
}
