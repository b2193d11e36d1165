use serde::Serialize;

use crate::geom::{ParamPoint, Point3, TorusSurface};

/// Time-ordered trajectory on the torus, kept both in parameter space and as
/// projected 3-D coordinates. All five arrays always have the same length.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Path {
    u: Vec<f64>,
    v: Vec<f64>,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

impl Path {
    /// Projects the parameter arrays through `surface`. Arrays of different
    /// length are truncated to the shorter one.
    #[must_use]
    pub fn from_params(mut u: Vec<f64>, mut v: Vec<f64>, surface: &TorusSurface) -> Self {
        let n = u.len().min(v.len());
        u.truncate(n);
        v.truncate(n);
        let (x, y, z) = surface.project_many(&u, &v);
        Self { u, v, x, y, z }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.u.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.u.is_empty()
    }

    #[must_use]
    pub fn u(&self) -> &[f64] {
        &self.u
    }

    #[must_use]
    pub fn v(&self) -> &[f64] {
        &self.v
    }

    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    #[must_use]
    pub fn z(&self) -> &[f64] {
        &self.z
    }

    #[must_use]
    pub fn param(&self, index: usize) -> Option<ParamPoint> {
        Some(ParamPoint {
            u: *self.u.get(index)?,
            v: *self.v.get(index)?,
        })
    }

    #[must_use]
    pub fn position(&self, index: usize) -> Option<Point3> {
        Some(Point3::new(
            *self.x.get(index)?,
            *self.y.get(index)?,
            *self.z.get(index)?,
        ))
    }

    pub fn positions(&self) -> impl Iterator<Item = Point3> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((&x, &y), &z)| Point3::new(x, y, z))
    }

    /// Smallest Euclidean distance from `point` to any sample of this path.
    #[must_use]
    pub fn nearest_distance(&self, point: Point3) -> Option<f64> {
        self.positions()
            .map(|p| p.distance_to(point))
            .min_by(f64::total_cmp)
    }
}
