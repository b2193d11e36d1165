//! Topology diagnostics for the torus mesh.
//!
//! The renderer relies on the surface mesh being closed: every undirected
//! edge must be shared by exactly two triangles. Diagnostics are collected
//! while the mesh is built and returned next to it.

use std::fmt;

use crate::timing::TimingReport;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct GeomMeshDiagnostics {
    /// Total number of vertices in the final mesh.
    pub vertex_count: usize,

    /// Total number of triangles in the final mesh.
    pub triangle_count: usize,

    /// Triangles referencing the same vertex twice.
    pub degenerate_triangle_count: usize,

    /// Edges with only one adjacent triangle (holes or seams).
    pub open_edge_count: usize,

    /// Edges with more than two adjacent triangles.
    pub non_manifold_edge_count: usize,

    /// Only populated with the `engine_metrics` feature on native targets.
    pub timing: Option<TimingReport>,

    pub warnings: Vec<String>,
}

impl GeomMeshDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the mesh has no open edges.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.open_edge_count == 0
    }

    /// Returns `true` if no edge is shared by more than two triangles.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    /// Closed two-manifold: every edge shared by exactly two triangles.
    #[must_use]
    pub fn is_closed_manifold(&self) -> bool {
        self.is_watertight() && self.is_manifold() && self.degenerate_triangle_count == 0
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Format: `"V:{vertices} T:{triangles} [issues...]"`
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("V:{} T:{}", self.vertex_count, self.triangle_count)];

        if self.degenerate_triangle_count > 0 {
            parts.push(format!("degenerate:{}", self.degenerate_triangle_count));
        }
        if self.open_edge_count > 0 {
            parts.push(format!("open:{}", self.open_edge_count));
        }
        if self.non_manifold_edge_count > 0 {
            parts.push(format!("non-manifold:{}", self.non_manifold_edge_count));
        }

        parts.join(" ")
    }
}

impl fmt::Display for GeomMeshDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mesh Diagnostics:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;

        if self.open_edge_count > 0 || self.non_manifold_edge_count > 0 || self.degenerate_triangle_count > 0 {
            writeln!(f, "  Topology issues:")?;
            if self.open_edge_count > 0 {
                writeln!(f, "    - Open edges: {}", self.open_edge_count)?;
            }
            if self.non_manifold_edge_count > 0 {
                writeln!(f, "    - Non-manifold edges: {}", self.non_manifold_edge_count)?;
            }
            if self.degenerate_triangle_count > 0 {
                writeln!(f, "    - Degenerate triangles: {}", self.degenerate_triangle_count)?;
            }
        }

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_only_present_issues() {
        let mut diag = GeomMeshDiagnostics::new();
        diag.vertex_count = 9;
        diag.triangle_count = 18;
        assert_eq!(diag.summary(), "V:9 T:18");
        assert!(diag.is_closed_manifold());

        diag.open_edge_count = 3;
        assert_eq!(diag.summary(), "V:9 T:18 open:3");
        assert!(!diag.is_watertight());
        assert!(diag.to_string().contains("Open edges: 3"));
    }
}
