mod core;
mod diagnostics;
mod mesh;
mod smoothing;
mod spline;
mod surface;
mod triangulation;

pub use self::core::{Point3, Tolerance, Vec3};
pub use diagnostics::GeomMeshDiagnostics;
pub use mesh::{EdgeTopology, GeomMesh, build_mesh, count_edge_topology, mesh_surface};
pub use smoothing::{GAUSSIAN_TRUNCATE, gaussian_filter1d, gaussian_kernel};
pub use spline::{CubicSpline, SplineBoundary, SplineError, linspace};
pub use surface::{
    DEFAULT_MAJOR_RADIUS, DEFAULT_MINOR_RADIUS, ParamPoint, Surface, SurfaceError, TorusSurface,
    to_xyz, to_xyz_many, wrap_angle,
};
pub use triangulation::triangulate_grid_wrapped;

#[cfg(test)]
mod tests;
