//! Edge incidence counting and border classification
//!
//! The incidence map must be rebuilt whenever the triangle buffer changes;
//! a stale map misclassifies borders.

use crate::triangle::{Edge, Triangle};
use std::collections::HashMap;

/// Number of triangles incident to each edge
#[derive(Debug, Clone, Default)]
pub struct EdgeCounts {
    counts: HashMap<Edge, usize>,
}

impl EdgeCounts {
    /// Count, for every edge of every triangle, how many triangles use it.
    pub fn build(triangles: &[Triangle]) -> Self {
        let mut counts: HashMap<Edge, usize> = HashMap::with_capacity(triangles.len() * 3 / 2);
        for triangle in triangles {
            for edge in triangle.edges() {
                *counts.entry(edge).or_insert(0) += 1;
            }
        }
        Self { counts }
    }

    /// Incident triangle count of `{i0, i1}` (0 when absent)
    pub fn count(&self, i0: usize, i1: usize) -> usize {
        self.counts.get(&Edge::new(i0, i1)).copied().unwrap_or(0)
    }

    /// An edge used by at most one triangle
    pub fn is_border_edge(&self, i0: usize, i1: usize) -> bool {
        self.count(i0, i1) <= 1
    }

    /// Whether any of the triangle's three edges is a border edge
    pub fn has_border_edge(&self, triangle: &Triangle) -> bool {
        triangle
            .edges()
            .iter()
            .any(|e| self.is_border_edge(e.i0, e.i1))
    }

    /// Number of distinct edges
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Edges used by exactly one triangle
    pub fn border_edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.counts
            .iter()
            .filter(|&(_, &count)| count <= 1)
            .map(|(edge, _)| *edge)
    }
}

/// The edge shared by two triangles, oriented as it appears in `t1`.
///
/// Each of `t1`'s edges is tested, in winding order, against `t2` in both
/// orientations.
pub fn shared_edge(t1: &Triangle, t2: &Triangle) -> Option<Edge> {
    t1.edges().into_iter().find(|e| t2.has_edge(e.i0, e.i1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Vec<Triangle> {
        // 0---1
        // | / |
        // 2---3
        vec![Triangle::new(0, 2, 1), Triangle::new(1, 2, 3)]
    }

    fn tetrahedron() -> Vec<Triangle> {
        vec![
            Triangle::new(0, 2, 1),
            Triangle::new(0, 1, 3),
            Triangle::new(0, 3, 2),
            Triangle::new(1, 2, 3),
        ]
    }

    #[test]
    fn test_counts_quad() {
        let counts = EdgeCounts::build(&quad());
        assert_eq!(counts.len(), 5);
        assert_eq!(counts.count(1, 2), 2);
        assert_eq!(counts.count(2, 1), 2);
        assert_eq!(counts.count(0, 1), 1);
        assert_eq!(counts.count(0, 3), 0);
        assert!(!counts.is_border_edge(2, 1));
        assert!(counts.is_border_edge(0, 2));
        assert!(counts.is_border_edge(0, 3));
        assert_eq!(counts.border_edges().count(), 4);
    }

    #[test]
    fn test_has_border_edge() {
        let counts = EdgeCounts::build(&quad());
        for t in quad() {
            assert!(counts.has_border_edge(&t));
        }

        let closed = tetrahedron();
        let counts = EdgeCounts::build(&closed);
        assert!(closed.iter().all(|t| !counts.has_border_edge(t)));
        assert_eq!(counts.border_edges().count(), 0);
    }

    #[test]
    fn test_shared_edge() {
        let q = quad();
        let edge = shared_edge(&q[0], &q[1]).unwrap();
        assert_eq!(edge, Edge::new(1, 2));
        // Orientation follows the first triangle
        assert_eq!((edge.i0, edge.i1), (2, 1));

        let far = Triangle::new(4, 5, 6);
        assert!(shared_edge(&q[0], &far).is_none());

        // Sharing a single vertex is not an edge
        let touching = Triangle::new(0, 7, 8);
        assert!(shared_edge(&q[0], &touching).is_none());
    }

    #[test]
    fn test_empty() {
        let counts = EdgeCounts::build(&[]);
        assert!(counts.is_empty());
        assert!(counts.is_border_edge(0, 1));
    }
}
