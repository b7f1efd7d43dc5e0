//! Vertex welding
//!
//! Merges vertices whose weighted attribute difference is within a threshold,
//! whether or not they share an edge. Each iteration merges a batch in which
//! no vertex takes part twice, then compacts the store once.

use crate::parallel::ParallelConfig;
use meshkit_core::{
    weighted_cost, CostWeights, Error, IndexedMesh, MeshPass, PassReport, Result, Vertex,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Welding settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeldConfig {
    /// Maximum number of merge batches
    pub iterations: usize,
    /// Pairs costing more than this are not merged
    pub max_weight: f32,
    pub weights: CostWeights,
}

impl Default for WeldConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            max_weight: 0.0,
            weights: CostWeights::default(),
        }
    }
}

impl WeldConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.max_weight.is_finite() || self.max_weight < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "max_weight must be finite and non-negative, got {}",
                self.max_weight
            )));
        }
        self.weights.validate()
    }
}

fn weldable(vertices: &[Vertex], a: usize, b: usize, config: &WeldConfig) -> bool {
    weighted_cost(&vertices[a], &vertices[b], &config.weights) <= config.max_weight
}

/// For every vertex, the first later vertex it may merge with
pub fn find_weld_candidates(
    vertices: &[Vertex],
    config: &WeldConfig,
    parallel: &ParallelConfig,
) -> Vec<Option<usize>> {
    parallel.map_range(vertices.len(), |a| {
        ((a + 1)..vertices.len()).find(|&b| weldable(vertices, a, b, config))
    })
}

/// Pair every unconsumed vertex with its first unconsumed later match.
///
/// `first_matches` comes from [`find_weld_candidates`]; when that match is
/// already taken the scan resumes after it. Returns `(lower, higher)` pairs;
/// no vertex appears in two pairs.
pub fn select_merges(
    vertices: &[Vertex],
    first_matches: &[Option<usize>],
    config: &WeldConfig,
) -> Vec<(usize, usize)> {
    let mut consumed = vec![false; vertices.len()];
    let mut merges = Vec::new();
    for (a, &first) in first_matches.iter().enumerate() {
        if consumed[a] {
            continue;
        }
        let Some(first) = first else {
            continue;
        };
        let partner = if consumed[first] {
            ((first + 1)..vertices.len())
                .find(|&b| !consumed[b] && weldable(vertices, a, b, config))
        } else {
            Some(first)
        };
        if let Some(b) = partner {
            consumed[a] = true;
            consumed[b] = true;
            merges.push((a, b));
        }
    }
    merges
}

/// Vertex welding pass
#[derive(Debug, Clone, Default)]
pub struct VertexWelder {
    pub config: WeldConfig,
    pub parallel: ParallelConfig,
}

impl VertexWelder {
    pub fn new(config: WeldConfig) -> Self {
        Self {
            config,
            parallel: ParallelConfig::default(),
        }
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Merge one batch and compact. Returns the number of merges.
    fn weld_batch(&self, mesh: &mut IndexedMesh) -> usize {
        let vertices = mesh.attributes.to_interleaved();
        let first_matches = find_weld_candidates(&vertices, &self.config, &self.parallel);
        let merges = select_merges(&vertices, &first_matches, &self.config);

        debug!(
            vertices = vertices.len(),
            merges = merges.len(),
            "welding iteration"
        );

        if merges.is_empty() {
            return 0;
        }

        let mut keep = vec![true; vertices.len()];
        let mut survivor: Vec<usize> = (0..vertices.len()).collect();
        for &(low, high) in &merges {
            let merged = Vertex::interpolate(&vertices[low], &vertices[high], 0.5);
            mesh.attributes.set(low, &merged);
            survivor[high] = low;
            keep[high] = false;
        }

        let remap = mesh.attributes.retain(&keep);
        for triangle in &mut mesh.triangles {
            // Survivors are always kept, so the lookup never misses
            *triangle = triangle.map(|i| remap[survivor[i]].unwrap_or(i));
        }

        merges.len()
    }
}

impl MeshPass for VertexWelder {
    fn name(&self) -> &'static str {
        "welding"
    }

    fn apply(&self, mesh: &mut IndexedMesh) -> Result<PassReport> {
        mesh.validate()?;
        self.config.validate()?;

        let mut report = PassReport::begin(self.name(), mesh);
        info!(
            vertices = mesh.vertex_count(),
            iterations = self.config.iterations,
            max_weight = self.config.max_weight,
            "welding started"
        );

        for _ in 0..self.config.iterations {
            report.iterations += 1;
            let merges = self.weld_batch(mesh);
            if merges == 0 {
                break;
            }
            report.operations += merges;
        }

        let report = report.finish(mesh);
        if report.degenerate_triangles > 0 {
            warn!(
                degenerate = report.degenerate_triangles,
                "welding left degenerate triangles"
            );
        }
        info!(
            merges = report.operations,
            vertices = report.vertices_after,
            "welding finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use meshkit_core::{Color, Point3f, Triangle, VertexAttributes};

    fn make_split_quad() -> IndexedMesh {
        // Vertex 3 duplicates vertex 1; vertex 4 must shift down to 3
        let attributes = VertexAttributes::new(vec![
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(1.0, 1.0, 0.0),
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 1.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
        ])
        .with_colors(vec![Color::new(1.0, 0.0, 0.0, 1.0); 5])
        .unwrap();
        IndexedMesh::new(
            attributes,
            vec![Triangle::new(0, 2, 1), Triangle::new(3, 2, 4)],
        )
        .unwrap()
    }

    fn sequential(config: WeldConfig) -> VertexWelder {
        VertexWelder::new(config).with_parallel(ParallelConfig::sequential())
    }

    #[test]
    fn test_config_defaults() {
        let config = WeldConfig::default();
        assert_eq!(config.iterations, 100);
        assert_eq!(config.max_weight, 0.0);
        assert!(config.validate().is_ok());
        assert!(WeldConfig {
            max_weight: f32::INFINITY,
            ..config
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_coincident_vertices_merge() {
        let mut mesh = make_split_quad();
        let report = sequential(WeldConfig::default()).apply(&mut mesh).unwrap();

        assert_eq!(report.operations, 1);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(
            mesh.triangles,
            vec![Triangle::new(0, 2, 1), Triangle::new(1, 2, 3)]
        );
        assert_eq!(mesh.attributes.colors().unwrap().len(), 4);
        assert_eq!(mesh.attributes.get(3).position, Point3f::new(1.0, 0.0, 0.0));
        mesh.validate().unwrap();
    }

    #[test]
    fn test_near_vertices_merge_at_midpoint() {
        let attributes = VertexAttributes::new(vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(0.0, 0.0, 0.002),
        ]);
        let mut mesh = IndexedMesh::new(
            attributes,
            vec![Triangle::new(0, 1, 2), Triangle::new(3, 2, 1)],
        )
        .unwrap();
        let welder = sequential(WeldConfig {
            max_weight: 1e-5,
            weights: CostWeights::edge_length_only(),
            ..WeldConfig::default()
        });
        let report = welder.apply(&mut mesh).unwrap();

        assert_eq!(report.operations, 1);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangles[1], Triangle::new(0, 2, 1));
        assert_relative_eq!(
            mesh.attributes.get(0).position,
            Point3f::new(0.0, 0.0, 0.001)
        );
    }

    #[test]
    fn test_no_vertex_merges_twice_per_batch() {
        let attributes = VertexAttributes::new(vec![Point3f::new(2.0, 2.0, 2.0); 3]);
        let mut mesh = IndexedMesh::new(attributes, vec![Triangle::new(0, 1, 2)]).unwrap();

        let vertices = mesh.attributes.to_interleaved();
        let config = WeldConfig::default();
        let first_matches =
            find_weld_candidates(&vertices, &config, &ParallelConfig::sequential());
        assert_eq!(first_matches, vec![Some(1), Some(2), None]);
        assert_eq!(select_merges(&vertices, &first_matches, &config), vec![(0, 1)]);

        let one_batch = sequential(WeldConfig {
            iterations: 1,
            ..WeldConfig::default()
        });
        let report = one_batch.apply(&mut mesh).unwrap();
        assert_eq!(report.operations, 1);
        assert_eq!(mesh.vertex_count(), 2);

        let report = sequential(WeldConfig::default()).apply(&mut mesh).unwrap();
        assert_eq!(report.operations, 1);
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.triangles, vec![Triangle::new(0, 0, 0)]);
        assert_eq!(report.degenerate_triangles, 1);
    }

    #[test]
    fn test_taken_match_falls_through_to_next() {
        // 0 and 1 both reach 2 first; 1 then pairs with 3
        let attributes = VertexAttributes::new(vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(2.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(2.5, 0.0, 0.0),
        ]);
        let vertices = attributes.to_interleaved();
        let config = WeldConfig {
            max_weight: 1.5,
            weights: CostWeights::edge_length_only(),
            ..WeldConfig::default()
        };
        let first_matches =
            find_weld_candidates(&vertices, &config, &ParallelConfig::sequential());
        assert_eq!(first_matches, vec![Some(2), Some(2), None, None]);
        assert_eq!(
            select_merges(&vertices, &first_matches, &config),
            vec![(0, 2), (1, 3)]
        );
    }

    #[test]
    fn test_coincident_cloud_halves_per_batch() {
        let attributes = VertexAttributes::new(vec![Point3f::new(1.0, 1.0, 1.0); 64]);
        let vertices = attributes.to_interleaved();
        let config = WeldConfig::default();
        let first_matches =
            find_weld_candidates(&vertices, &config, &ParallelConfig::sequential());
        assert_eq!(first_matches.len(), 64);
        assert_eq!(first_matches[63], None);

        let merges = select_merges(&vertices, &first_matches, &config);
        assert_eq!(merges.len(), 32);
        assert!(merges.iter().all(|&(a, b)| b == a + 1 && a % 2 == 0));

        let mut mesh = IndexedMesh::new(attributes, vec![Triangle::new(0, 31, 63)]).unwrap();
        let report = sequential(WeldConfig::default()).apply(&mut mesh).unwrap();
        assert_eq!(report.iterations, 7);
        assert_eq!(mesh.vertex_count(), 1);
    }

    #[test]
    fn test_each_merge_removes_one_vertex() {
        let mut positions = Vec::new();
        for i in 0..40 {
            // Every position appears twice
            positions.push(Point3f::new((i % 20) as f32, 0.0, 0.0));
        }
        let triangles = (0..38).map(|i| Triangle::new(i, i + 1, i + 2)).collect();
        let mut mesh = IndexedMesh::new(VertexAttributes::new(positions), triangles).unwrap();

        let report = sequential(WeldConfig::default()).apply(&mut mesh).unwrap();
        assert_eq!(
            report.vertices_before - report.vertices_after,
            report.operations
        );
        assert_eq!(mesh.vertex_count(), 20);
        mesh.validate().unwrap();
    }

    #[test]
    fn test_idempotent_and_parallel() {
        let mut mesh = make_split_quad();
        let mut parallel = mesh.clone();
        sequential(WeldConfig::default()).apply(&mut mesh).unwrap();
        VertexWelder::new(WeldConfig::default())
            .with_parallel(ParallelConfig::default().with_min_parallel_len(1))
            .apply(&mut parallel)
            .unwrap();
        assert_eq!(mesh, parallel);

        let converged = mesh.clone();
        let report = sequential(WeldConfig::default()).apply(&mut mesh).unwrap();
        assert!(!report.changed());
        assert_eq!(mesh, converged);
    }

    #[test]
    fn test_color_difference_blocks_merge() {
        let attributes = VertexAttributes::new(vec![Point3f::origin(); 3])
            .with_colors(vec![
                Color::new(1.0, 0.0, 0.0, 1.0),
                Color::new(0.0, 1.0, 0.0, 1.0),
                Color::new(0.0, 0.0, 1.0, 1.0),
            ])
            .unwrap();
        let mut mesh = IndexedMesh::new(attributes, vec![Triangle::new(0, 1, 2)]).unwrap();
        let report = sequential(WeldConfig {
            max_weight: 1.0,
            ..WeldConfig::default()
        })
        .apply(&mut mesh)
        .unwrap();
        assert_eq!(report.operations, 0);
        assert_eq!(mesh.vertex_count(), 3);
    }
}
