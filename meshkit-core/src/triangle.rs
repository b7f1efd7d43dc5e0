//! Triangle and edge index types

use crate::point::*;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// An ordered triple of vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle {
    pub i0: usize,
    pub i1: usize,
    pub i2: usize,
}

impl Triangle {
    pub fn new(i0: usize, i1: usize, i2: usize) -> Self {
        Self { i0, i1, i2 }
    }

    pub fn indices(&self) -> [usize; 3] {
        [self.i0, self.i1, self.i2]
    }

    /// The three edges in winding order: `(i0,i1)`, `(i1,i2)`, `(i2,i0)`
    pub fn edges(&self) -> [Edge; 3] {
        [
            Edge::new(self.i0, self.i1),
            Edge::new(self.i1, self.i2),
            Edge::new(self.i2, self.i0),
        ]
    }

    /// Whether the triangle has the edge `{i0, i1}` in either orientation
    pub fn has_edge(&self, i0: usize, i1: usize) -> bool {
        self.edges().contains(&Edge::new(i0, i1))
    }

    pub fn contains(&self, vertex: usize) -> bool {
        self.i0 == vertex || self.i1 == vertex || self.i2 == vertex
    }

    /// Two or more corners reference the same vertex
    pub fn is_degenerate(&self) -> bool {
        self.i0 == self.i1 || self.i1 == self.i2 || self.i2 == self.i0
    }

    pub fn area(&self, positions: &[Point3f]) -> f32 {
        triangle_area(
            &positions[self.i0],
            &positions[self.i1],
            &positions[self.i2],
        )
    }

    /// Apply `f` to every corner index
    pub fn map(self, mut f: impl FnMut(usize) -> usize) -> Self {
        Self::new(f(self.i0), f(self.i1), f(self.i2))
    }
}

impl From<[usize; 3]> for Triangle {
    fn from(indices: [usize; 3]) -> Self {
        Self::new(indices[0], indices[1], indices[2])
    }
}

/// An unordered pair of vertex indices.
///
/// `Edge::new(a, b) == Edge::new(b, a)` and both hash identically, so an
/// edge can key a map regardless of the winding it was found in. The
/// orientation it was built with is still available through `i0`/`i1`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Edge {
    pub i0: usize,
    pub i1: usize,
}

impl Edge {
    pub fn new(i0: usize, i1: usize) -> Self {
        Self { i0, i1 }
    }

    pub fn lower(&self) -> usize {
        self.i0.min(self.i1)
    }

    pub fn higher(&self) -> usize {
        self.i0.max(self.i1)
    }

    /// `(lower, higher)` pair
    pub fn key(&self) -> (usize, usize) {
        (self.lower(), self.higher())
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}
