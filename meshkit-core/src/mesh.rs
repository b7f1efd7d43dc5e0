//! Indexed triangle mesh: a vertex attribute store plus a triangle list

use crate::attributes::VertexAttributes;
use crate::error::{Error, Result};
use crate::triangle::Triangle;
use serde::{Deserialize, Serialize};

/// A triangle mesh with parallel vertex attributes and an index buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedMesh {
    pub attributes: VertexAttributes,
    pub triangles: Vec<Triangle>,
}

impl IndexedMesh {
    /// Create a mesh from attributes and triangles, checking every invariant
    pub fn new(attributes: VertexAttributes, triangles: Vec<Triangle>) -> Result<Self> {
        let mesh = Self {
            attributes,
            triangles,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Create a mesh from a flat index buffer as supplied by a host
    pub fn from_flat_indices(attributes: VertexAttributes, indices: &[u32]) -> Result<Self> {
        if indices.len() % 3 != 0 {
            return Err(Error::NotTriangulated(indices.len()));
        }
        let triangles = indices
            .chunks_exact(3)
            .map(|c| Triangle::new(c[0] as usize, c[1] as usize, c[2] as usize))
            .collect();
        Self::new(attributes, triangles)
    }

    /// Flatten the triangle list back into a host index buffer
    pub fn to_flat_indices(&self) -> Vec<u32> {
        self.triangles
            .iter()
            .flat_map(|t| t.indices())
            .map(|i| i as u32)
            .collect()
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.attributes.len()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() || self.triangles.is_empty()
    }

    /// Check the structural invariants: attribute arrays agree in length and
    /// every triangle index is in range. Degenerate triangles are not an
    /// error here; see [`IndexedMesh::degenerate_triangle_count`].
    pub fn validate(&self) -> Result<()> {
        self.attributes.validate()?;
        let vertex_count = self.vertex_count();
        for triangle in &self.triangles {
            if let Some(&index) = triangle.indices().iter().find(|&&i| i >= vertex_count) {
                return Err(Error::IndexOutOfRange {
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Number of triangles with a repeated corner index
    pub fn degenerate_triangle_count(&self) -> usize {
        self.triangles.iter().filter(|t| t.is_degenerate()).count()
    }

    /// Vertices referenced by at least one triangle
    pub fn referenced_vertices(&self) -> Vec<bool> {
        let mut used = vec![false; self.vertex_count()];
        for triangle in &self.triangles {
            for i in triangle.indices() {
                used[i] = true;
            }
        }
        used
    }

    /// Drop vertices no triangle references and renumber the triangles.
    ///
    /// Returns the number of vertices removed.
    pub fn remove_unreferenced_vertices(&mut self) -> usize {
        let used = self.referenced_vertices();
        let removed = used.iter().filter(|&&u| !u).count();
        if removed == 0 {
            return 0;
        }

        let remap = self.attributes.retain(&used);
        for triangle in &mut self.triangles {
            // Every referenced vertex survived the compaction
            *triangle = triangle.map(|i| remap[i].unwrap_or(i));
        }
        removed
    }

    /// Sum of all triangle areas
    pub fn surface_area(&self) -> f32 {
        let positions = self.attributes.positions();
        self.triangles.iter().map(|t| t.area(positions)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::*;

    fn quad_attributes() -> VertexAttributes {
        VertexAttributes::new(vec![
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(1.0, 1.0, 0.0),
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
        ])
    }

    #[test]
    fn test_flat_indices_round_trip() {
        let indices = [0u32, 2, 1, 1, 2, 3];
        let mesh = IndexedMesh::from_flat_indices(quad_attributes(), &indices).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.to_flat_indices(), indices.to_vec());
    }

    #[test]
    fn test_not_triangulated() {
        let err = IndexedMesh::from_flat_indices(quad_attributes(), &[0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, Error::NotTriangulated(4)));
    }

    #[test]
    fn test_index_out_of_range() {
        let err = IndexedMesh::from_flat_indices(quad_attributes(), &[0, 1, 4]).unwrap_err();
        assert!(matches!(
            err,
            Error::IndexOutOfRange {
                index: 4,
                vertex_count: 4
            }
        ));
    }

    #[test]
    fn test_remove_unreferenced_vertices() {
        let attributes = VertexAttributes::new(vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(5.0, 5.0, 5.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ]);
        let mut mesh = IndexedMesh::new(attributes, vec![Triangle::new(0, 2, 3)]).unwrap();
        assert_eq!(mesh.remove_unreferenced_vertices(), 1);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangles, vec![Triangle::new(0, 1, 2)]);
        assert_eq!(mesh.attributes.get(1).position, Point3f::new(1.0, 0.0, 0.0));
        mesh.validate().unwrap();

        assert_eq!(mesh.remove_unreferenced_vertices(), 0);
    }

    #[test]
    fn test_degenerate_count_and_area() {
        let mut mesh =
            IndexedMesh::from_flat_indices(quad_attributes(), &[0, 2, 1, 1, 2, 3]).unwrap();
        assert_eq!(mesh.degenerate_triangle_count(), 0);
        assert!((mesh.surface_area() - 1.0).abs() < 1e-6);

        mesh.triangles.push(Triangle::new(1, 1, 3));
        assert_eq!(mesh.degenerate_triangle_count(), 1);
    }
}
