//! Statistics returned by every pass

use crate::mesh::IndexedMesh;
use serde::Serialize;
use std::fmt;

/// Outcome of one pass over a mesh
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Name of the pass that produced this report
    pub pass: &'static str,
    /// Iterations actually run (at most the configured budget)
    pub iterations: usize,
    /// Collapses, merges or subdivisions performed
    pub operations: usize,
    pub triangles_before: usize,
    pub triangles_after: usize,
    pub vertices_before: usize,
    pub vertices_after: usize,
    /// Triangles with a repeated corner after the pass
    pub degenerate_triangles: usize,
}

impl PassReport {
    /// Start a report from the mesh state before the pass runs
    pub fn begin(pass: &'static str, mesh: &IndexedMesh) -> Self {
        Self {
            pass,
            iterations: 0,
            operations: 0,
            triangles_before: mesh.triangle_count(),
            triangles_after: mesh.triangle_count(),
            vertices_before: mesh.vertex_count(),
            vertices_after: mesh.vertex_count(),
            degenerate_triangles: mesh.degenerate_triangle_count(),
        }
    }

    /// Record the mesh state after the pass
    pub fn finish(mut self, mesh: &IndexedMesh) -> Self {
        self.triangles_after = mesh.triangle_count();
        self.vertices_after = mesh.vertex_count();
        self.degenerate_triangles = mesh.degenerate_triangle_count();
        self
    }

    /// Whether the pass changed the mesh
    pub fn changed(&self) -> bool {
        self.operations > 0
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} → {} triangles, {} → {} vertices ({} operations in {} iterations)",
            self.pass,
            self.triangles_before,
            self.triangles_after,
            self.vertices_before,
            self.vertices_after,
            self.operations,
            self.iterations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Point3f, Triangle, VertexAttributes};

    #[test]
    fn test_begin_finish() {
        let attributes = VertexAttributes::new(vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ]);
        let mut mesh = IndexedMesh::new(attributes, vec![Triangle::new(0, 1, 2)]).unwrap();
        let report = PassReport::begin("test", &mesh);
        assert!(!report.changed());

        mesh.triangles.clear();
        let mut report = report.finish(&mesh);
        report.operations = 1;
        assert_eq!(report.triangles_before, 1);
        assert_eq!(report.triangles_after, 0);
        assert!(report.changed());
        assert!(report.to_string().starts_with("test: 1 → 0 triangles"));
    }
}
