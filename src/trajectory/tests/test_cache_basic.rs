use std::sync::Arc;

use crate::geom::{ParamPoint, TorusSurface};
use crate::trajectory::cache::{PathKey, PathKind, TrajectoryCache};
use crate::trajectory::intervention::InterventionVector;
use crate::trajectory::path::Path;

fn key(kind: PathKind, months: u32) -> PathKey {
    PathKey::new(kind, months, ParamPoint::new(1.5, 0.8), 43, &TorusSurface::default())
}

fn sample_path() -> Path {
    Path::from_params(vec![0.1, 0.2], vec![0.3, 0.4], &TorusSurface::default())
}

#[test]
fn second_lookup_is_a_hit() {
    let mut cache = TrajectoryCache::default();
    let first = cache
        .get_or_try_insert_with(key(PathKind::StatusQuo, 12), || Ok::<_, ()>(sample_path()))
        .unwrap();
    let second = cache
        .get_or_try_insert_with(key(PathKind::StatusQuo, 12), || -> Result<Path, ()> {
            panic!("must not rebuild a cached path")
        })
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    let stats = cache.stats();
    assert_eq!((stats.entries, stats.hits, stats.misses), (1, 1, 1));
    assert!((stats.hit_rate() - 0.5).abs() < 1e-12);
}

#[test]
fn keys_distinguish_horizon_kind_and_interventions() {
    let base = key(PathKind::Intervention, 12);
    let vector = InterventionVector::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    assert_ne!(base, key(PathKind::Intervention, 6));
    assert_ne!(base, key(PathKind::StatusQuo, 12));
    assert_ne!(base, base.with_interventions(&vector));
    assert_eq!(base.with_interventions(&vector), base.with_interventions(&vector));
}

#[test]
fn failed_build_is_not_stored() {
    let mut cache = TrajectoryCache::default();
    let result = cache.get_or_try_insert_with(key(PathKind::Healthy, 3), || Err::<Path, _>("boom"));
    assert_eq!(result, Err("boom"));
    assert!(cache.get(&key(PathKind::Healthy, 3)).is_none());
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn overflow_clears_and_zero_capacity_disables() {
    let mut cache = TrajectoryCache::with_capacity(1);
    for months in [3, 6] {
        cache
            .get_or_try_insert_with(key(PathKind::StatusQuo, months), || Ok::<_, ()>(sample_path()))
            .unwrap();
    }
    assert_eq!(cache.stats().entries, 1);
    assert!(cache.get(&key(PathKind::StatusQuo, 6)).is_some());

    let mut disabled = TrajectoryCache::with_capacity(0);
    disabled
        .get_or_try_insert_with(key(PathKind::StatusQuo, 3), || Ok::<_, ()>(sample_path()))
        .unwrap();
    assert_eq!(disabled.stats().entries, 0);

    cache.clear();
    let stats = cache.stats();
    assert_eq!((stats.entries, stats.hits, stats.misses), (0, 0, 0));
    assert_eq!(stats.capacity, 1);
}
