#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod geom;
pub mod timing;
pub mod trajectory;

use std::fmt;

use config::{ConfigError, EngineConfig};
use geom::GeomMesh;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use trajectory::{
    ComparisonRecord, InterventionVector, ReportSummarizer, Scene, SceneRequest, Slider,
    TemplateSummarizer, TimeHorizon, TrajectoryCache, TrajectoryCacheStats, TrajectoryError,
    build_scene_mesh, recompute, resolve_preset, summarize_or_message,
};
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("kon rayon threadpool niet initialiseren: {err}")))
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

#[derive(Debug, Serialize)]
struct SliderExport {
    id: &'static str,
    name: &'static str,
    min: f64,
    max: f64,
    step: f64,
    value: f64,
}

#[derive(Debug, Serialize)]
struct MeshExport<'a> {
    positions: &'a [f64],
    normals: &'a [f64],
    indices: &'a [u32],
}

#[derive(Debug, Serialize)]
struct ReportExport<'a> {
    record: &'a ComparisonRecord,
    summary: String,
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct Engine {
    initialized: bool,
    config: EngineConfig,
    interventions: InterventionVector,
    horizon: TimeHorizon,
    cache: TrajectoryCache,
    jitter_rng: StdRng,
    mesh: Option<GeomMesh>,
    scene: Option<Scene>,
    dirty: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Engine {
        Self::build(EngineConfig::default())
    }

    /// Maak een engine met een (gedeeltelijke) configuratie; ontbrekende
    /// velden krijgen hun standaardwaarde.
    #[wasm_bindgen]
    pub fn with_config(config: JsValue) -> Result<Engine, JsValue> {
        let config: EngineConfig = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js_error)?
        };
        Self::from_config(config).map_err(to_js_error)
    }

    /// Geeft terug of de engine de minimale initialisatie heeft doorlopen.
    #[wasm_bindgen]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Haal slider-specificaties op voor UI-generatie.
    #[wasm_bindgen]
    pub fn get_sliders(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.slider_exports())
            .map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Stel een sliderwaarde in op basis van id of label.
    #[wasm_bindgen]
    pub fn set_slider_value(&mut self, id_or_name: &str, value: f64) -> Result<(), JsValue> {
        self.set_slider(id_or_name, value)
            .map(|_| ())
            .map_err(|err| js_error(&err))
    }

    /// Kies de voorspellingshorizon in maanden (3, 6 of 12).
    #[wasm_bindgen]
    pub fn set_time_horizon(&mut self, months: u32) -> Result<(), JsValue> {
        let horizon = TimeHorizon::try_from(months).map_err(to_js_error)?;
        self.set_horizon(horizon);
        Ok(())
    }

    /// Pas een scenario (`minimal_lifestyle`, `timeline:<id>`, ...) toe.
    #[wasm_bindgen]
    pub fn apply_scenario(&mut self, name: &str) -> Result<(), JsValue> {
        self.apply_preset(name).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn reset_interventions(&mut self) {
        self.set_interventions(InterventionVector::NEUTRAL);
    }

    /// Herbereken de scène wanneer sliders of horizon gewijzigd zijn.
    #[wasm_bindgen]
    pub fn evaluate(&mut self) -> Result<(), JsValue> {
        self.recompute().map(|_| ()).map_err(to_js_error)
    }

    /// Haalt de statische torusmesh op als platte buffers.
    #[wasm_bindgen]
    pub fn get_mesh(&mut self) -> Result<JsValue, JsValue> {
        let mesh = self.mesh().map_err(to_js_error)?;
        let export = MeshExport {
            positions: mesh.positions_flat(),
            normals: mesh.normals_flat(),
            indices: &mesh.indices,
        };
        serde_wasm_bindgen::to_value(&export).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Haalt paden en metrics van de laatste evaluatie op.
    #[wasm_bindgen]
    pub fn get_scene(&self) -> Result<JsValue, JsValue> {
        let scene = self.evaluated_scene().map_err(js_error)?;
        serde_wasm_bindgen::to_value(scene).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Vergelijkingsrecord plus een tekstuele samenvatting.
    #[wasm_bindgen]
    pub fn get_report(&self) -> Result<JsValue, JsValue> {
        let scene = self.evaluated_scene().map_err(js_error)?;
        let export = ReportExport {
            record: &scene.comparison,
            summary: summarize_or_message(&TemplateSummarizer, &scene.comparison),
        };
        serde_wasm_bindgen::to_value(&export).map_err(|err| JsError::new(&err.to_string()).into())
    }
}

impl Engine {
    fn build(config: EngineConfig) -> Self {
        let jitter_rng = match config.jitter_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::try_from_os_rng().unwrap_or_else(|err| {
                log::warn!("geen OS-entropie beschikbaar ({err}); jitter gebruikt seed 0");
                StdRng::seed_from_u64(0)
            }),
        };
        Self {
            initialized: true,
            cache: TrajectoryCache::with_capacity(config.cache_capacity),
            config,
            interventions: InterventionVector::NEUTRAL,
            horizon: TimeHorizon::default(),
            jitter_rng,
            mesh: None,
            scene: None,
            dirty: true,
        }
    }

    pub fn from_config(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn interventions(&self) -> &InterventionVector {
        &self.interventions
    }

    #[must_use]
    pub fn horizon(&self) -> TimeHorizon {
        self.horizon
    }

    #[must_use]
    pub fn cache_stats(&self) -> TrajectoryCacheStats {
        self.cache.stats()
    }

    /// Laatste scène, ook wanneer er sindsdien invoer gewijzigd is.
    #[must_use]
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Huidige sliders in vaste volgorde met hun waarde.
    pub fn sliders(&self) -> impl Iterator<Item = (Slider, f64)> + '_ {
        Slider::ALL
            .into_iter()
            .map(|slider| (slider, self.interventions.get(slider)))
    }

    /// Zet een slider op `value`, begrensd en afgerond op de stapgrootte.
    /// Geeft de werkelijk ingestelde waarde terug.
    pub fn set_slider(&mut self, id_or_name: &str, value: f64) -> Result<f64, String> {
        if !value.is_finite() {
            return Err("sliderwaarde moet een eindig getal zijn".to_owned());
        }
        let slider = find_slider(id_or_name).ok_or_else(|| match Slider::suggest(id_or_name) {
            Some(name) => format!("onbekende sliderreferentie (bedoelde je `{name}`?)"),
            None => "onbekende sliderreferentie".to_owned(),
        })?;

        let snapped = slider.spec().clamp_and_snap(value);
        if self.interventions.get(slider) != snapped {
            self.interventions.set(slider, snapped);
            self.dirty = true;
        }
        Ok(snapped)
    }

    pub fn set_horizon(&mut self, horizon: TimeHorizon) {
        if self.horizon != horizon {
            self.horizon = horizon;
            self.dirty = true;
        }
    }

    /// Vervangt alle sliders; waarden worden begrensd en afgerond.
    pub fn set_interventions(&mut self, vector: InterventionVector) {
        let snapped = vector.snapped();
        if self.interventions != snapped {
            self.interventions = snapped;
            self.dirty = true;
        }
    }

    /// Scenario's zetten alleen sliders; tijdlijnen ook hun horizon.
    pub fn apply_preset(&mut self, name: &str) -> Result<(), TrajectoryError> {
        let preset =
            resolve_preset(name).ok_or_else(|| TrajectoryError::UnknownPreset(name.to_owned()))?;
        if let Some(months) = preset.horizon_months {
            self.set_horizon(TimeHorizon::try_from(months)?);
        }
        self.set_interventions(preset.interventions);
        Ok(())
    }

    /// Native tegenhanger van `evaluate`; hergebruikt de scène wanneer er
    /// niets gewijzigd is.
    pub fn recompute(&mut self) -> Result<&Scene, TrajectoryError> {
        let scene = match self.scene.take() {
            Some(scene) if !self.dirty => scene,
            previous => {
                let request = SceneRequest {
                    horizon: self.horizon,
                    interventions: self.interventions,
                };
                match recompute(&self.config, &request, &mut self.cache, &mut self.jitter_rng) {
                    Ok(scene) => scene,
                    Err(err) => {
                        self.scene = previous;
                        return Err(err);
                    }
                }
            }
        };
        debug_log!(
            "scene: horizon={} status={}",
            scene.horizon.months(),
            scene.comparison.status_label
        );
        self.dirty = false;
        Ok(self.scene.insert(scene))
    }

    /// De torusmesh; wordt bij de eerste aanroep opgebouwd.
    pub fn mesh(&mut self) -> Result<&GeomMesh, TrajectoryError> {
        let mesh = match self.mesh.take() {
            Some(mesh) => mesh,
            None => {
                let (mesh, diagnostics) = build_scene_mesh(&self.config)?;
                if !diagnostics.warnings.is_empty() {
                    log::warn!("mesh diagnostics: {diagnostics}");
                }
                mesh
            }
        };
        Ok(self.mesh.insert(mesh))
    }

    /// Samenvatting van de laatste scène via `summarizer`; fouten worden
    /// vervangen door een weergavebare melding.
    #[must_use]
    pub fn report_summary(&self, summarizer: &dyn ReportSummarizer) -> Option<String> {
        self.scene
            .as_ref()
            .map(|scene| summarize_or_message(summarizer, &scene.comparison))
    }

    fn evaluated_scene(&self) -> Result<&Scene, &'static str> {
        if self.dirty {
            return Err("scène is nog niet geëvalueerd");
        }
        self.scene.as_ref().ok_or("scène is nog niet geëvalueerd")
    }

    fn slider_exports(&self) -> Vec<SliderExport> {
        self.sliders()
            .map(|(slider, value)| {
                let spec = slider.spec();
                SliderExport {
                    id: slider.key(),
                    name: slider.label(),
                    min: spec.min,
                    max: spec.max,
                    step: spec.step,
                    value,
                }
            })
            .collect()
    }
}

fn find_slider(id_or_name: &str) -> Option<Slider> {
    let trimmed = id_or_name.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = normalize_name(trimmed);
    Slider::ALL.into_iter().find(|slider| {
        slider.key() == trimmed || normalize_name(slider.label()) == normalized
    })
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_engine() -> Engine {
        Engine::from_config(EngineConfig {
            jitter_seed: Some(7),
            ..EngineConfig::default()
        })
        .expect("valid config")
    }

    #[test]
    fn sliders_are_found_by_id_or_label() {
        assert_eq!(find_slider("sleep_change"), Some(Slider::SleepChange));
        assert_eq!(
            find_slider("  alcohol reduction (%) "),
            Some(Slider::AlcoholReduction)
        );
        assert_eq!(find_slider(""), None);
        assert_eq!(find_slider("coffee"), None);
    }

    #[test]
    fn set_slider_clamps_and_snaps() {
        let mut engine = seeded_engine();
        assert_eq!(engine.set_slider("caffeine_reduction", 130.0), Ok(150.0));
        assert_eq!(engine.set_slider("sleep_change", 9.0), Ok(4.0));
        assert_eq!(engine.interventions().caffeine_reduction, 150.0);
        assert!(engine.set_slider("sleep_change", f64::NAN).is_err());

        let err = engine.set_slider("sleep_chnge", 1.0).unwrap_err();
        assert!(err.contains("sleep_change"), "{err}");
    }

    #[test]
    fn evaluate_is_a_no_op_when_clean() {
        let mut engine = seeded_engine();
        assert!(engine.is_dirty());
        engine.recompute().expect("first evaluation");
        let stats = engine.cache_stats();
        engine.recompute().expect("second evaluation");
        assert_eq!(engine.cache_stats(), stats);

        engine.set_slider("vo2max_change", 20.0).expect("slider");
        assert!(engine.is_dirty());
        engine.recompute().expect("third evaluation");
        assert_eq!(engine.cache_stats().hits, stats.hits + 3);
    }

    #[test]
    fn timelines_set_the_horizon() {
        let mut engine = seeded_engine();
        engine.apply_preset("timeline:3_month_intensive").expect("preset");
        assert_eq!(engine.horizon(), TimeHorizon::Three);
        assert_eq!(engine.interventions().metformin_dose, 1000.0);

        let scene = engine.recompute().expect("evaluation");
        assert_eq!(scene.status_quo.len(), 60);

        assert_eq!(
            engine.apply_preset("weekend_binge"),
            Err(TrajectoryError::UnknownPreset("weekend_binge".to_owned()))
        );
    }

    #[test]
    fn report_requires_an_evaluated_scene() {
        let mut engine = seeded_engine();
        assert!(engine.report_summary(&TemplateSummarizer).is_none());
        assert!(engine.evaluated_scene().is_err());
        engine.apply_preset("moderate_comprehensive").expect("preset");
        engine.recompute().expect("evaluation");
        let summary = engine.report_summary(&TemplateSummarizer).expect("summary");
        assert!(summary.contains("Interventions: Sleep Duration Change"));
    }

    #[test]
    fn mesh_is_built_once() {
        let mut engine = seeded_engine();
        let triangles = engine.mesh().expect("mesh").triangle_count();
        assert_eq!(triangles, 2 * 160 * 70);
    }
}
