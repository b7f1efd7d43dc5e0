//! Parallel per-vertex attribute arrays
//!
//! [`VertexAttributes`] is the single owner of every per-vertex array of a
//! mesh. Positions are always present; normals, colors, tangents and UVs are
//! present or absent for the whole mesh. All reads, writes, removals and
//! interpolation go through the store so the arrays never drift apart.

use crate::error::{Error, Result};
use crate::point::*;
use crate::vertex::Vertex;
use serde::{Deserialize, Serialize};

/// Parallel vertex attribute arrays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexAttributes {
    positions: Vec<Point3f>,
    normals: Option<Vec<Vector3f>>,
    colors: Option<Vec<Color>>,
    tangents: Option<Vec<Vector4f>>,
    uvs: Option<Vec<Vector4f>>,
}

fn check_len(attribute: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::AttributeLengthMismatch {
            attribute,
            expected,
            actual,
        });
    }
    Ok(())
}

impl VertexAttributes {
    /// Create a store holding only positions
    pub fn new(positions: Vec<Point3f>) -> Self {
        Self {
            positions,
            normals: None,
            colors: None,
            tangents: None,
            uvs: None,
        }
    }

    /// Create a store from interleaved vertices, keeping the listed optional
    /// attributes.
    pub fn from_vertices(vertices: &[Vertex], layout: AttributeLayout) -> Self {
        Self {
            positions: vertices.iter().map(|v| v.position).collect(),
            normals: layout
                .normals
                .then(|| vertices.iter().map(|v| v.normal).collect()),
            colors: layout
                .colors
                .then(|| vertices.iter().map(|v| v.color).collect()),
            tangents: layout
                .tangents
                .then(|| vertices.iter().map(|v| v.tangent).collect()),
            uvs: layout.uvs.then(|| vertices.iter().map(|v| v.uv).collect()),
        }
    }

    pub fn with_normals(mut self, normals: Vec<Vector3f>) -> Result<Self> {
        check_len("normals", self.positions.len(), normals.len())?;
        self.normals = Some(normals);
        Ok(self)
    }

    pub fn with_colors(mut self, colors: Vec<Color>) -> Result<Self> {
        check_len("colors", self.positions.len(), colors.len())?;
        self.colors = Some(colors);
        Ok(self)
    }

    pub fn with_tangents(mut self, tangents: Vec<Vector4f>) -> Result<Self> {
        check_len("tangents", self.positions.len(), tangents.len())?;
        self.tangents = Some(tangents);
        Ok(self)
    }

    pub fn with_uvs(mut self, uvs: Vec<Vector4f>) -> Result<Self> {
        check_len("uvs", self.positions.len(), uvs.len())?;
        self.uvs = Some(uvs);
        Ok(self)
    }

    /// Number of vertices
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    pub fn has_tangents(&self) -> bool {
        self.tangents.is_some()
    }

    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    /// Which optional attributes this store carries
    pub fn layout(&self) -> AttributeLayout {
        AttributeLayout {
            normals: self.has_normals(),
            colors: self.has_colors(),
            tangents: self.has_tangents(),
            uvs: self.has_uvs(),
        }
    }

    pub fn positions(&self) -> &[Point3f] {
        &self.positions
    }

    pub fn normals(&self) -> Option<&[Vector3f]> {
        self.normals.as_deref()
    }

    pub fn colors(&self) -> Option<&[Color]> {
        self.colors.as_deref()
    }

    pub fn tangents(&self) -> Option<&[Vector4f]> {
        self.tangents.as_deref()
    }

    pub fn uvs(&self) -> Option<&[Vector4f]> {
        self.uvs.as_deref()
    }

    /// Check that every present attribute array matches the position count.
    pub fn validate(&self) -> Result<()> {
        let n = self.positions.len();
        if let Some(normals) = &self.normals {
            check_len("normals", n, normals.len())?;
        }
        if let Some(colors) = &self.colors {
            check_len("colors", n, colors.len())?;
        }
        if let Some(tangents) = &self.tangents {
            check_len("tangents", n, tangents.len())?;
        }
        if let Some(uvs) = &self.uvs {
            check_len("uvs", n, uvs.len())?;
        }
        Ok(())
    }

    /// Read the vertex at `index`. Absent attributes read as their default.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn get(&self, index: usize) -> Vertex {
        Vertex {
            position: self.positions[index],
            normal: self
                .normals
                .as_ref()
                .map_or_else(Vector3f::zeros, |n| n[index]),
            color: self.colors.as_ref().map_or_else(Color::zeros, |c| c[index]),
            tangent: self
                .tangents
                .as_ref()
                .map_or_else(Vector4f::zeros, |t| t[index]),
            uv: self.uvs.as_ref().map_or_else(Vector4f::zeros, |u| u[index]),
        }
    }

    /// Overwrite the vertex at `index`. Absent attributes are not stored.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn set(&mut self, index: usize, vertex: &Vertex) {
        self.positions[index] = vertex.position;
        if let Some(normals) = &mut self.normals {
            normals[index] = vertex.normal;
        }
        if let Some(colors) = &mut self.colors {
            colors[index] = vertex.color;
        }
        if let Some(tangents) = &mut self.tangents {
            tangents[index] = vertex.tangent;
        }
        if let Some(uvs) = &mut self.uvs {
            uvs[index] = vertex.uv;
        }
    }

    /// Append a vertex and return its index
    pub fn push(&mut self, vertex: &Vertex) -> usize {
        let index = self.positions.len();
        self.positions.push(vertex.position);
        if let Some(normals) = &mut self.normals {
            normals.push(vertex.normal);
        }
        if let Some(colors) = &mut self.colors {
            colors.push(vertex.color);
        }
        if let Some(tangents) = &mut self.tangents {
            tangents.push(vertex.tangent);
        }
        if let Some(uvs) = &mut self.uvs {
            uvs.push(vertex.uv);
        }
        index
    }

    /// Remove the vertex at `index`, shifting every later vertex down by one.
    ///
    /// Triangle indices referencing later vertices must be decremented by
    /// the caller. Prefer [`VertexAttributes::retain`] when removing many.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn remove_at(&mut self, index: usize) {
        self.positions.remove(index);
        if let Some(normals) = &mut self.normals {
            normals.remove(index);
        }
        if let Some(colors) = &mut self.colors {
            colors.remove(index);
        }
        if let Some(tangents) = &mut self.tangents {
            tangents.remove(index);
        }
        if let Some(uvs) = &mut self.uvs {
            uvs.remove(index);
        }
    }

    /// Keep only the vertices whose entry in `keep` is true, compacting every
    /// array in one sweep.
    ///
    /// Returns the old-index to new-index map (`None` for removed vertices).
    ///
    /// # Panics
    ///
    /// Panics if `keep.len() != self.len()`.
    pub fn retain(&mut self, keep: &[bool]) -> Vec<Option<usize>> {
        assert_eq!(keep.len(), self.len(), "keep mask must cover every vertex");

        let mut remap = Vec::with_capacity(keep.len());
        let mut next = 0usize;
        for &k in keep {
            if k {
                remap.push(Some(next));
                next += 1;
            } else {
                remap.push(None);
            }
        }

        fn compact<T>(values: &mut Vec<T>, keep: &[bool]) {
            let mut it = keep.iter();
            values.retain(|_| *it.next().unwrap_or(&false));
        }

        compact(&mut self.positions, keep);
        if let Some(normals) = &mut self.normals {
            compact(normals, keep);
        }
        if let Some(colors) = &mut self.colors {
            compact(colors, keep);
        }
        if let Some(tangents) = &mut self.tangents {
            compact(tangents, keep);
        }
        if let Some(uvs) = &mut self.uvs {
            compact(uvs, keep);
        }

        remap
    }

    /// Copy the listed vertices, in order, into a new store with the same
    /// layout.
    pub fn subset(&self, indices: &[usize]) -> Self {
        fn pick<T: Copy>(values: &[T], indices: &[usize]) -> Vec<T> {
            indices.iter().map(|&i| values[i]).collect()
        }

        Self {
            positions: pick(&self.positions, indices),
            normals: self.normals.as_deref().map(|n| pick(n, indices)),
            colors: self.colors.as_deref().map(|c| pick(c, indices)),
            tangents: self.tangents.as_deref().map(|t| pick(t, indices)),
            uvs: self.uvs.as_deref().map(|u| pick(u, indices)),
        }
    }

    /// Interpolate between two stored vertices.
    pub fn interpolate(&self, i0: usize, i1: usize, t: f32) -> Vertex {
        Vertex::interpolate(&self.get(i0), &self.get(i1), t)
    }

    /// Interleave all attributes, absent ones as their defaults.
    pub fn to_interleaved(&self) -> Vec<Vertex> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }
}

/// Presence flags for the optional attributes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeLayout {
    pub normals: bool,
    pub colors: bool,
    pub tangents: bool,
    pub uvs: bool,
}

impl AttributeLayout {
    /// Layout with every optional attribute present
    pub fn all() -> Self {
        Self {
            normals: true,
            colors: true,
            tangents: true,
            uvs: true,
        }
    }
}
