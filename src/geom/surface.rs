use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use super::core::{Point3, Tolerance, Vec3};

/// Default major radius (distance from the torus center to the tube center).
pub const DEFAULT_MAJOR_RADIUS: f64 = 3.0;
/// Default minor radius (tube thickness).
pub const DEFAULT_MINOR_RADIUS: f64 = 1.15;

fn wrap_param(value: f64, start: f64, end: f64) -> f64 {
    let span = end - start;
    if !span.is_finite() || span == 0.0 {
        return start;
    }
    let mut t = (value - start) % span;
    if t < 0.0 {
        t += span;
    }
    // `-1e-18 % TAU + TAU` rounds to TAU itself; fold it back onto the start.
    if t >= span {
        t -= span;
    }
    start + t
}

/// Wraps an angle onto `[0, 2π)`.
#[must_use]
pub fn wrap_angle(value: f64) -> f64 {
    wrap_param(value, 0.0, TAU)
}

/// A point in the doubly periodic `(u, v)` parameter space of the torus.
/// Deserialized points are wrapped like [`ParamPoint::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawParamPoint")]
pub struct ParamPoint {
    pub u: f64,
    pub v: f64,
}

#[derive(Deserialize)]
struct RawParamPoint {
    u: f64,
    v: f64,
}

impl From<RawParamPoint> for ParamPoint {
    fn from(raw: RawParamPoint) -> Self {
        Self::new(raw.u, raw.v)
    }
}

impl ParamPoint {
    /// Creates a parameter point, wrapping both angles onto `[0, 2π)`.
    #[must_use]
    pub fn new(u: f64, v: f64) -> Self {
        Self {
            u: wrap_angle(u),
            v: wrap_angle(v),
        }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.u.is_finite() && self.v.is_finite()
    }

    /// Bit pattern of both coordinates, usable as a hash/cache key.
    #[must_use]
    pub fn to_bits(self) -> [u64; 2] {
        [self.u.to_bits(), self.v.to_bits()]
    }
}

impl Default for ParamPoint {
    fn default() -> Self {
        Self::new(1.5, 0.8)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SurfaceError {
    #[error("torus major radius must be finite and > 0 (got {0})")]
    InvalidMajorRadius(f64),
    #[error("torus minor radius must be finite and > 0 (got {0})")]
    InvalidMinorRadius(f64),
}

pub trait Surface {
    fn point_at(&self, u: f64, v: f64) -> Point3;

    #[must_use]
    fn domain_u(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    #[must_use]
    fn domain_v(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    #[must_use]
    fn is_u_closed(&self) -> bool {
        false
    }

    #[must_use]
    fn is_v_closed(&self) -> bool {
        false
    }

    /// First partial derivatives by central differences, wrapping across
    /// closed directions and clamping inside open ones.
    #[must_use]
    fn partial_derivatives_at(&self, u: f64, v: f64) -> (Vec3, Vec3) {
        let (u0, u1) = self.domain_u();
        let (v0, v1) = self.domain_v();

        let mut du = Vec3::ZERO;
        let mut dv = Vec3::ZERO;

        let h = Tolerance::DERIVATIVE.relative_to(u1 - u0);
        if h.is_finite() && h > 0.0 {
            let (ua, ub) = if self.is_u_closed() {
                (u - h, u + h)
            } else {
                ((u - h).max(u0), (u + h).min(u1))
            };
            if ua != ub {
                du = (self.point_at(ub, v) - self.point_at(ua, v)).mul_scalar(1.0 / (ub - ua));
            }
        }

        let h = Tolerance::DERIVATIVE.relative_to(v1 - v0);
        if h.is_finite() && h > 0.0 {
            let (va, vb) = if self.is_v_closed() {
                (v - h, v + h)
            } else {
                ((v - h).max(v0), (v + h).min(v1))
            };
            if va != vb {
                dv = (self.point_at(u, vb) - self.point_at(u, va)).mul_scalar(1.0 / (vb - va));
            }
        }

        (du, dv)
    }

    #[must_use]
    fn normal_at(&self, u: f64, v: f64) -> Option<Vec3> {
        let (du, dv) = self.partial_derivatives_at(u, v);
        du.cross(dv).normalized()
    }
}

/// Axis-aligned torus centered at the origin, parameterised by two angles.
///
/// `u` runs around the major circle in the XY plane, `v` around the tube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorusSurface {
    pub major_radius: f64,
    pub minor_radius: f64,
}

impl TorusSurface {
    pub fn new(major_radius: f64, minor_radius: f64) -> Result<Self, SurfaceError> {
        if !major_radius.is_finite() || major_radius <= 0.0 {
            return Err(SurfaceError::InvalidMajorRadius(major_radius));
        }
        if !minor_radius.is_finite() || minor_radius <= 0.0 {
            return Err(SurfaceError::InvalidMinorRadius(minor_radius));
        }
        Ok(Self {
            major_radius,
            minor_radius,
        })
    }

    #[must_use]
    pub fn project(&self, point: ParamPoint) -> Point3 {
        self.point_at(point.u, point.v)
    }

    /// Projects parallel `u`/`v` arrays; see [`to_xyz_many`].
    #[must_use]
    pub fn project_many(&self, u: &[f64], v: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        to_xyz_many(u, v, self.major_radius, self.minor_radius)
    }
}

impl Default for TorusSurface {
    fn default() -> Self {
        Self {
            major_radius: DEFAULT_MAJOR_RADIUS,
            minor_radius: DEFAULT_MINOR_RADIUS,
        }
    }
}

impl Surface for TorusSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        to_xyz(u, v, self.major_radius, self.minor_radius)
    }

    fn domain_u(&self) -> (f64, f64) {
        (0.0, TAU)
    }

    fn domain_v(&self) -> (f64, f64) {
        (0.0, TAU)
    }

    fn is_u_closed(&self) -> bool {
        true
    }

    fn is_v_closed(&self) -> bool {
        true
    }

    /// Outward tube normal. It only depends on the angles, not on the radii.
    fn normal_at(&self, u: f64, v: f64) -> Option<Vec3> {
        let (sin_u, cos_u) = u.sin_cos();
        let (sin_v, cos_v) = v.sin_cos();
        Some(Vec3::new(cos_v * cos_u, cos_v * sin_u, sin_v))
    }
}

/// Maps `(u, v)` onto the torus with major radius `major` and minor radius `minor`.
#[must_use]
pub fn to_xyz(u: f64, v: f64, major: f64, minor: f64) -> Point3 {
    let (sin_u, cos_u) = u.sin_cos();
    let (sin_v, cos_v) = v.sin_cos();
    let ring = major + minor * cos_v;
    Point3::new(ring * cos_u, ring * sin_u, minor * sin_v)
}

/// Vectorised [`to_xyz`]. Extra entries in the longer input are ignored.
#[must_use]
pub fn to_xyz_many(u: &[f64], v: &[f64], major: f64, minor: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    debug_assert_eq!(u.len(), v.len(), "u/v arrays must have the same length");
    let n = u.len().min(v.len());
    let mut xs = Vec::with_capacity(n);
    let mut ys = Vec::with_capacity(n);
    let mut zs = Vec::with_capacity(n);
    for (&ui, &vi) in u.iter().zip(v) {
        let p = to_xyz(ui, vi, major, minor);
        xs.push(p.x);
        ys.push(p.y);
        zs.push(p.z);
    }
    (xs, ys, zs)
}
