//! Path caching for repeated recomputations.
//!
//! Slider changes only invalidate the intervention path; historical, status
//! quo and healthy paths depend on the horizon, start point and seed alone and
//! are served from here between evaluations.
//!
//! # Example
//! ```ignore
//! let mut cache = TrajectoryCache::default();
//! let path = cache.get_or_try_insert_with(key, || status_quo_path(start, 12, 43, &torus))?;
//! println!("hit rate: {:.2}", cache.stats().hit_rate());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::intervention::InterventionVector;
use super::path::Path;
use crate::geom::{ParamPoint, TorusSurface};

pub const DEFAULT_CACHE_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    Historical,
    StatusQuo,
    Healthy,
    Intervention,
}

/// Everything a generated path depends on, compared bitwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathKey {
    kind: PathKind,
    /// Months for forecasts, weeks for the historical path.
    length: u32,
    start: [u64; 2],
    surface: [u64; 2],
    seed: u64,
    interventions: u64,
}

impl PathKey {
    #[must_use]
    pub fn new(kind: PathKind, length: u32, start: ParamPoint, seed: u64, surface: &TorusSurface) -> Self {
        Self {
            kind,
            length,
            start: start.to_bits(),
            surface: [surface.major_radius.to_bits(), surface.minor_radius.to_bits()],
            seed,
            interventions: 0,
        }
    }

    #[must_use]
    pub fn with_interventions(mut self, vector: &InterventionVector) -> Self {
        self.interventions = vector.fingerprint();
        self
    }

    #[must_use]
    pub const fn kind(&self) -> PathKind {
        self.kind
    }
}

/// Cache statistics for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TrajectoryCacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: usize,
    pub misses: usize,
}

impl TrajectoryCacheStats {
    /// Between 0.0 and 1.0; 0.0 before the first lookup.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded path cache. When an insert would exceed the capacity every entry
/// is dropped first.
#[derive(Debug)]
pub struct TrajectoryCache {
    entries: HashMap<PathKey, Arc<Path>>,
    capacity: usize,
    hits: usize,
    misses: usize,
}

impl Default for TrajectoryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl TrajectoryCache {
    /// A capacity of zero disables caching.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    #[must_use]
    pub fn stats(&self) -> TrajectoryCacheStats {
        TrajectoryCacheStats {
            entries: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
        }
    }

    /// Clears all entries and resets the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.reset_counters();
    }

    pub fn reset_counters(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    /// Lookup without touching the counters.
    #[must_use]
    pub fn get(&self, key: &PathKey) -> Option<Arc<Path>> {
        self.entries.get(key).cloned()
    }

    /// Returns the cached path for `key` or builds, stores and returns it.
    /// A failing `make` leaves the cache untouched apart from the miss.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: PathKey,
        make: impl FnOnce() -> Result<Path, E>,
    ) -> Result<Arc<Path>, E> {
        if let Some(path) = self.entries.get(&key) {
            self.hits += 1;
            log::debug!("path cache hit: {:?}", key.kind);
            return Ok(Arc::clone(path));
        }

        self.misses += 1;
        log::debug!("path cache miss: {:?}", key.kind);
        let path = Arc::new(make()?);
        if self.capacity > 0 {
            if self.entries.len() >= self.capacity {
                self.entries.clear();
            }
            self.entries.insert(key, Arc::clone(&path));
        }
        Ok(path)
    }
}
