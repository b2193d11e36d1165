use std::collections::HashMap;

use serde::Serialize;

use super::diagnostics::GeomMeshDiagnostics;
use super::surface::{Surface, SurfaceError, TorusSurface};
use super::triangulation::triangulate_grid_wrapped;
use crate::timing::{TimingBucket, Timings};

/// Triangle mesh with per-vertex normals and parameter-space coordinates.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GeomMesh {
    pub positions: Vec<[f64; 3]>,
    /// Outward unit normal per vertex.
    pub normals: Vec<[f64; 3]>,
    /// The `(u, v)` sample each vertex was generated from.
    pub uvs: Vec<[f64; 2]>,
    /// Flat triangle list, three indices per triangle.
    pub indices: Vec<u32>,
}

impl GeomMesh {
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions
            .iter()
            .any(|p| !p[0].is_finite() || !p[1].is_finite() || !p[2].is_finite())
    }

    /// Returns true if all vertex indices are within bounds.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len() as u32;
        self.indices.iter().all(|&i| i < n)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err("mesh indices are not a triangle list (len % 3 != 0)".to_string());
        }
        if self.has_invalid_vertices() {
            return Err("mesh has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        if !self.has_valid_indices() {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        if self.normals.len() != self.positions.len() || self.uvs.len() != self.positions.len() {
            return Err("mesh attribute buffers do not match vertex count".to_string());
        }
        Ok(())
    }

    /// Position buffer as `[x0, y0, z0, x1, ...]` without copying.
    #[must_use]
    pub fn positions_flat(&self) -> &[f64] {
        self.positions.as_flattened()
    }

    /// Normal buffer as `[nx0, ny0, nz0, nx1, ...]` without copying.
    #[must_use]
    pub fn normals_flat(&self) -> &[f64] {
        self.normals.as_flattened()
    }
}

/// Samples `count` parameters over `[start, end]`. Closed directions leave out
/// the end value because it coincides with the start.
fn grid_params(start: f64, end: f64, count: usize, closed: bool) -> Vec<f64> {
    let divisions = if closed { count } else { count.saturating_sub(1).max(1) };
    let step = (end - start) / divisions as f64;
    (0..count).map(|i| start + step * i as f64).collect()
}

type Vertex = ([f64; 3], [f64; 3], [f64; 2]);

fn sample_vertex(surface: &(impl Surface + Sync), u: f64, v: f64) -> Vertex {
    let p = surface.point_at(u, v);
    let n = surface
        .normal_at(u, v)
        .map_or([0.0, 0.0, 0.0], |n| n.to_array());
    (p.to_array(), n, [u, v])
}

#[cfg(feature = "parallel")]
fn sample_grid(surface: &(impl Surface + Sync), us: &[f64], vs: &[f64]) -> Vec<Vertex> {
    use rayon::prelude::*;

    vs.par_iter()
        .flat_map_iter(|&v| us.iter().map(move |&u| sample_vertex(surface, u, v)))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn sample_grid(surface: &(impl Surface + Sync), us: &[f64], vs: &[f64]) -> Vec<Vertex> {
    vs.iter()
        .flat_map(|&v| us.iter().map(move |&u| sample_vertex(surface, u, v)))
        .collect()
}

/// Tessellates `surface` on a `u_count × v_count` grid, row by row in `v`
/// (`index = v * u_count + u`). Closed directions wrap their indices so no
/// seam is left open.
#[must_use]
pub fn mesh_surface(
    surface: &(impl Surface + Sync),
    u_count: usize,
    v_count: usize,
    timings: &mut Timings,
) -> (GeomMesh, GeomMeshDiagnostics) {
    let wrap_u = surface.is_u_closed();
    let wrap_v = surface.is_v_closed();
    let u_count = if wrap_u { u_count.max(3) } else { u_count.max(2) };
    let v_count = if wrap_v { v_count.max(3) } else { v_count.max(2) };

    let (u0, u1) = surface.domain_u();
    let (v0, v1) = surface.domain_v();
    let us = grid_params(u0, u1, u_count, wrap_u);
    let vs = grid_params(v0, v1, v_count, wrap_v);

    let vertices = timings.time(TimingBucket::Tessellation, || sample_grid(surface, &us, &vs));
    let indices = timings.time(TimingBucket::Triangulation, || {
        triangulate_grid_wrapped(u_count, v_count, wrap_u, wrap_v)
    });

    let mut mesh = GeomMesh {
        positions: Vec::with_capacity(vertices.len()),
        normals: Vec::with_capacity(vertices.len()),
        uvs: Vec::with_capacity(vertices.len()),
        indices,
    };
    for (position, normal, uv) in vertices {
        mesh.positions.push(position);
        mesh.normals.push(normal);
        mesh.uvs.push(uv);
    }

    let topology = count_edge_topology(&mesh.indices);
    let mut diagnostics = GeomMeshDiagnostics {
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        degenerate_triangle_count: topology.degenerate_triangles,
        open_edge_count: topology.open_edges,
        non_manifold_edge_count: topology.non_manifold_edges,
        ..GeomMeshDiagnostics::default()
    };
    if topology.open_edges > 0 {
        diagnostics.add_warning("mesh has open edges");
    }
    if topology.non_manifold_edges > 0 {
        diagnostics.add_warning("mesh has non-manifold edges");
    }
    if mesh.normals.iter().any(|n| *n == [0.0, 0.0, 0.0]) {
        diagnostics.add_warning("surface normal undefined at some vertices");
    }

    log::debug!("mesh_surface: {}", diagnostics.summary());
    (mesh, diagnostics)
}

/// Builds the static torus mesh with `nu` samples around the major circle
/// and `nv` around the tube. Fewer than 3 samples per direction is raised to 3.
pub fn build_mesh(
    nu: usize,
    nv: usize,
    major_radius: f64,
    minor_radius: f64,
) -> Result<(GeomMesh, GeomMeshDiagnostics), SurfaceError> {
    let surface = TorusSurface::new(major_radius, minor_radius)?;
    let mut timings = Timings::default();
    timings.begin();
    let (mesh, mut diagnostics) = mesh_surface(&surface, nu, nv, &mut timings);
    diagnostics.timing = timings.end();
    Ok((mesh, diagnostics))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeTopology {
    pub open_edges: usize,
    pub non_manifold_edges: usize,
    pub degenerate_triangles: usize,
}

/// Counts undirected edges by how many triangles share them.
#[must_use]
pub fn count_edge_topology(indices: &[u32]) -> EdgeTopology {
    let mut edge_counts: HashMap<(u32, u32), u32> = HashMap::new();
    let mut topology = EdgeTopology::default();

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0], tri[1], tri[2]);
        if i0 == i1 || i1 == i2 || i0 == i2 {
            topology.degenerate_triangles += 1;
            continue;
        }

        for (ea, eb) in [(i0, i1), (i1, i2), (i2, i0)] {
            let key = if ea <= eb { (ea, eb) } else { (eb, ea) };
            *edge_counts.entry(key).or_insert(0) += 1;
        }
    }

    for count in edge_counts.into_values() {
        if count == 1 {
            topology.open_edges += 1;
        } else if count > 2 {
            topology.non_manifold_edges += 1;
        }
    }

    topology
}
