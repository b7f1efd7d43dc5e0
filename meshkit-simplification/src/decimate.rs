//! Edge-collapse decimation
//!
//! Each iteration rebuilds the edge incidence map, scans every pair of
//! interior triangles for a shared edge, keeps the pairs whose weighted cost
//! is within budget and collapses a non-conflicting batch of them. The loop
//! stops at the iteration budget or after a pass with no collapse.
//!
//! Collapsed vertices are left in the store unreferenced; run
//! [`IndexedMesh::remove_unreferenced_vertices`] or the welder afterwards to
//! compact them away.

use crate::clustering::{cluster_by_connectivity, Cluster};
use crate::parallel::ParallelConfig;
use meshkit_core::{
    shared_edge, weighted_cost, CostWeights, Edge, EdgeCounts, Error, IndexedMesh, MeshPass,
    PassReport, Result, Triangle, Vertex, VertexAttributes,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ============================================================
// Configuration
// ============================================================

/// Decimation settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecimationConfig {
    /// Maximum number of collapse passes
    pub iterations: usize,
    /// Candidates costing more than this are rejected
    pub max_total_weight: f32,
    pub weights: CostWeights,
}

impl Default for DecimationConfig {
    fn default() -> Self {
        Self {
            iterations: 3,
            max_total_weight: 1.0,
            weights: CostWeights::default(),
        }
    }
}

impl DecimationConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.max_total_weight.is_finite() || self.max_total_weight < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "max_total_weight must be finite and non-negative, got {}",
                self.max_total_weight
            )));
        }
        self.weights.validate()
    }
}

// ============================================================
// Candidate Search
// ============================================================

/// Two interior triangles sharing an edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollapseCandidate {
    /// Offset of the first triangle in the buffer
    pub t1: usize,
    /// Offset of the second triangle, always after `t1`
    pub t2: usize,
    /// Shared edge, oriented as in `t1`
    pub edge: Edge,
    pub cost: f32,
}

/// Every pair of non-border triangles sharing an edge whose cost is within
/// `max_total_weight`, in discovery order.
pub fn find_collapse_candidates(
    vertices: &[Vertex],
    triangles: &[Triangle],
    config: &DecimationConfig,
    parallel: &ParallelConfig,
) -> Vec<CollapseCandidate> {
    let counts = EdgeCounts::build(triangles);
    let interior: Vec<bool> = triangles
        .iter()
        .map(|t| !counts.has_border_edge(t))
        .collect();

    let per_triangle = parallel.map_range(triangles.len(), |t1| {
        let mut found = Vec::new();
        if !interior[t1] {
            return found;
        }
        for t2 in (t1 + 1)..triangles.len() {
            if !interior[t2] {
                continue;
            }
            if let Some(edge) = shared_edge(&triangles[t1], &triangles[t2]) {
                let cost = weighted_cost(&vertices[edge.i0], &vertices[edge.i1], &config.weights);
                // NaN costs fail this test and are rejected
                if cost <= config.max_total_weight {
                    found.push(CollapseCandidate { t1, t2, edge, cost });
                }
            }
        }
        found
    });

    per_triangle.into_iter().flatten().collect()
}

/// Pick a batch of candidates whose triangles touch pairwise disjoint vertex
/// sets, walking them in discovery order. The batch is maximal, not the
/// cheapest possible one.
pub fn select_independent(
    candidates: Vec<CollapseCandidate>,
    triangles: &[Triangle],
    vertex_count: usize,
) -> Vec<CollapseCandidate> {
    let mut covered = vec![false; vertex_count];
    let mut selected = Vec::new();
    for candidate in candidates {
        let corners = triangles[candidate.t1]
            .indices()
            .into_iter()
            .chain(triangles[candidate.t2].indices());
        if corners.clone().any(|v| covered[v]) {
            continue;
        }
        for v in corners {
            covered[v] = true;
        }
        selected.push(candidate);
    }
    selected
}

// ============================================================
// Cluster Decimation
// ============================================================

/// A cluster's buffers in local indices, with the original buffer offset of
/// every remaining triangle
struct ClusterMesh {
    attributes: VertexAttributes,
    triangles: Vec<Triangle>,
    slots: Vec<usize>,
    iterations: usize,
    collapses: usize,
}

// ============================================================
// Decimator
// ============================================================

/// Greedy edge-collapse decimation pass
#[derive(Debug, Clone, Default)]
pub struct Decimator {
    pub config: DecimationConfig,
    pub parallel: ParallelConfig,
}

impl Decimator {
    pub fn new(config: DecimationConfig) -> Self {
        Self {
            config,
            parallel: ParallelConfig::default(),
        }
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Collapse one batch in place. Returns the number of collapses.
    fn collapse_batch(&self, cluster: &mut ClusterMesh) -> usize {
        let vertices = cluster.attributes.to_interleaved();
        let candidates =
            find_collapse_candidates(&vertices, &cluster.triangles, &self.config, &self.parallel);
        let found = candidates.len();
        let batch = select_independent(candidates, &cluster.triangles, vertices.len());

        debug!(
            triangles = cluster.triangles.len(),
            candidates = found,
            batch = batch.len(),
            "decimation iteration"
        );

        if batch.is_empty() {
            return 0;
        }

        let mut remap: Vec<usize> = (0..vertices.len()).collect();
        let mut removed = vec![false; cluster.triangles.len()];
        for candidate in &batch {
            let (low, high) = (candidate.edge.lower(), candidate.edge.higher());
            let merged = Vertex::interpolate(&vertices[low], &vertices[high], 0.5);
            cluster.attributes.set(low, &merged);
            remap[high] = low;
            removed[candidate.t1] = true;
            removed[candidate.t2] = true;
        }

        let (triangles, slots): (Vec<Triangle>, Vec<usize>) = cluster
            .triangles
            .iter()
            .zip(&cluster.slots)
            .zip(&removed)
            .filter(|(_, &gone)| !gone)
            .map(|((t, &slot), _)| (t.map(|i| remap[i]), slot))
            .unzip();
        cluster.triangles = triangles;
        cluster.slots = slots;

        batch.len()
    }

    fn decimate_cluster(&self, mut cluster: ClusterMesh) -> ClusterMesh {
        for _ in 0..self.config.iterations {
            cluster.iterations += 1;
            let collapses = self.collapse_batch(&mut cluster);
            if collapses == 0 {
                break;
            }
            cluster.collapses += collapses;
        }
        cluster
    }
}

impl MeshPass for Decimator {
    fn name(&self) -> &'static str {
        "decimation"
    }

    fn apply(&self, mesh: &mut IndexedMesh) -> Result<PassReport> {
        mesh.validate()?;
        self.config.validate()?;

        let mut report = PassReport::begin(self.name(), mesh);
        info!(
            triangles = mesh.triangle_count(),
            vertices = mesh.vertex_count(),
            iterations = self.config.iterations,
            max_total_weight = self.config.max_total_weight,
            "decimation started"
        );

        let clustering = cluster_by_connectivity(mesh.vertex_count(), &mesh.triangles)?;

        // Clusters are vertex-disjoint, so one table serves them all
        let mut local_of = vec![0usize; mesh.vertex_count()];
        for cluster in &clustering.clusters {
            for (local, &global) in cluster.vertices.iter().enumerate() {
                local_of[global] = local;
            }
        }

        let work: Vec<&Cluster> = clustering
            .clusters
            .iter()
            .filter(|c| c.triangles.len() >= 2)
            .collect();

        let source: &IndexedMesh = mesh;
        let outcomes: Vec<ClusterMesh> = self.parallel.map_slice(&work, |cluster| {
            let local = ClusterMesh {
                attributes: source.attributes.subset(&cluster.vertices),
                triangles: cluster
                    .triangles
                    .iter()
                    .map(|&t| source.triangles[t].map(|i| local_of[i]))
                    .collect(),
                slots: cluster.triangles.clone(),
                iterations: 0,
                collapses: 0,
            };
            self.decimate_cluster(local)
        });

        report.iterations = outcomes.iter().map(|o| o.iterations).max().unwrap_or(0);
        report.operations = outcomes.iter().map(|o| o.collapses).sum();

        if report.operations > 0 {
            let mut rebuilt: Vec<Option<Triangle>> =
                mesh.triangles.iter().copied().map(Some).collect();
            for (cluster, outcome) in work.iter().zip(&outcomes) {
                if outcome.collapses == 0 {
                    continue;
                }
                for (local, &global) in cluster.vertices.iter().enumerate() {
                    mesh.attributes.set(global, &outcome.attributes.get(local));
                }
                for &slot in &cluster.triangles {
                    rebuilt[slot] = None;
                }
                for (triangle, &slot) in outcome.triangles.iter().zip(&outcome.slots) {
                    rebuilt[slot] = Some(triangle.map(|i| cluster.vertices[i]));
                }
            }
            mesh.triangles = rebuilt.into_iter().flatten().collect();
        }

        let report = report.finish(mesh);
        if report.degenerate_triangles > 0 {
            warn!(
                degenerate = report.degenerate_triangles,
                "decimation left degenerate triangles"
            );
        }
        info!(
            collapses = report.operations,
            clusters = work.len(),
            triangles = report.triangles_after,
            "decimation finished"
        );
        Ok(report)
    }
}
