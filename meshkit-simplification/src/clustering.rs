//! Connectivity clustering
//!
//! Partitions the vertices of a mesh into connected components of its edge
//! graph. Clusters share no vertices, so each one can be decimated on its own
//! and no collapse can bridge two separate mesh islands.
//!
//! A geometric pre-pass, [`planar_regions`], groups triangles by orientation
//! instead. It is independent of the connectivity partition.

use meshkit_core::{normalize_or_zero, Error, Point3f, Result, Triangle, Vector3f};

// ============================================================
// Connectivity Clusters
// ============================================================

/// A connected component of the mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub id: usize,
    /// Member vertices in ascending order
    pub vertices: Vec<usize>,
    /// Offsets into the triangle list, in buffer order
    pub triangles: Vec<usize>,
}

/// Vertex and triangle partition into connected components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clustering {
    pub clusters: Vec<Cluster>,
    /// Cluster id of every vertex
    pub vertex_to_cluster: Vec<usize>,
    /// Cluster id of every triangle
    pub triangle_to_cluster: Vec<usize>,
}

impl Clustering {
    /// Number of clusters
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn cluster_of_vertex(&self, vertex: usize) -> &Cluster {
        &self.clusters[self.vertex_to_cluster[vertex]]
    }

    pub fn cluster_of_triangle(&self, triangle: usize) -> &Cluster {
        &self.clusters[self.triangle_to_cluster[triangle]]
    }
}

fn check_indices(vertex_count: usize, triangles: &[Triangle]) -> Result<()> {
    for triangle in triangles {
        for index in triangle.indices() {
            if index >= vertex_count {
                return Err(Error::IndexOutOfRange {
                    index,
                    vertex_count,
                });
            }
        }
    }
    Ok(())
}

/// Undirected adjacency lists built from every triangle edge
fn build_adjacency(vertex_count: usize, triangles: &[Triangle]) -> Vec<Vec<usize>> {
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];
    for triangle in triangles {
        for edge in triangle.edges() {
            adjacency[edge.i0].push(edge.i1);
            adjacency[edge.i1].push(edge.i0);
        }
    }
    for neighbors in &mut adjacency {
        neighbors.sort_unstable();
        neighbors.dedup();
    }
    adjacency
}

/// Partition vertices into connected components by flood fill.
///
/// Cluster ids are assigned in order of each component's lowest vertex.
/// Vertices referenced by no triangle form singleton clusters. A triangle
/// belongs to the cluster of its first vertex, which is also the cluster of
/// the other two.
pub fn cluster_by_connectivity(vertex_count: usize, triangles: &[Triangle]) -> Result<Clustering> {
    check_indices(vertex_count, triangles)?;

    let adjacency = build_adjacency(vertex_count, triangles);
    let mut vertex_to_cluster: Vec<Option<usize>> = vec![None; vertex_count];
    let mut clusters: Vec<Cluster> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    for seed in 0..vertex_count {
        if vertex_to_cluster[seed].is_some() {
            continue;
        }

        let id = clusters.len();
        let mut vertices = Vec::new();
        vertex_to_cluster[seed] = Some(id);
        stack.push(seed);

        while let Some(v) = stack.pop() {
            vertices.push(v);
            for &next in &adjacency[v] {
                if vertex_to_cluster[next].is_none() {
                    vertex_to_cluster[next] = Some(id);
                    stack.push(next);
                }
            }
        }

        vertices.sort_unstable();
        clusters.push(Cluster {
            id,
            vertices,
            triangles: Vec::new(),
        });
    }

    // Every vertex was seeded or reached above
    let vertex_to_cluster: Vec<usize> = vertex_to_cluster
        .into_iter()
        .map(|c| c.unwrap_or_default())
        .collect();

    let triangle_to_cluster: Vec<usize> = triangles
        .iter()
        .map(|t| vertex_to_cluster[t.i0])
        .collect();
    for (offset, &cluster) in triangle_to_cluster.iter().enumerate() {
        clusters[cluster].triangles.push(offset);
    }

    Ok(Clustering {
        clusters,
        vertex_to_cluster,
        triangle_to_cluster,
    })
}

// ============================================================
// Planar Regions
// ============================================================

/// Triangles grouped by orientation
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarRegions {
    /// Region of every triangle
    pub triangle_region: Vec<usize>,
    /// Plane normal of every region, taken from its first triangle
    pub normals: Vec<Vector3f>,
    /// Region each vertex was last assigned to
    pub vertex_region: Vec<Option<usize>>,
}

impl PlanarRegions {
    pub fn len(&self) -> usize {
        self.normals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normals.is_empty()
    }
}

/// Group triangles into near-coplanar regions.
///
/// A triangle joins the region of the first of its corners whose region
/// normal has a dot product of at least `min_dot` with the triangle normal;
/// otherwise it opens a new region. A vertex shared by several regions
/// reports the last one that claimed it.
pub fn planar_regions(
    positions: &[Point3f],
    triangles: &[Triangle],
    min_dot: f32,
) -> Result<PlanarRegions> {
    if !min_dot.is_finite() {
        return Err(Error::InvalidConfig(format!(
            "min_dot must be finite, got {}",
            min_dot
        )));
    }
    check_indices(positions.len(), triangles)?;

    let mut regions = PlanarRegions {
        triangle_region: Vec::with_capacity(triangles.len()),
        normals: Vec::new(),
        vertex_region: vec![None; positions.len()],
    };

    for triangle in triangles {
        let [i0, i1, i2] = triangle.indices();
        let normal =
            normalize_or_zero(&(positions[i1] - positions[i0]).cross(&(positions[i2] - positions[i0])));

        let matching = triangle.indices().into_iter().find_map(|corner| {
            regions.vertex_region[corner]
                .filter(|&region| regions.normals[region].dot(&normal) >= min_dot)
        });

        let region = matching.unwrap_or_else(|| {
            regions.normals.push(normal);
            regions.normals.len() - 1
        });

        for corner in triangle.indices() {
            regions.vertex_region[corner] = Some(region);
        }
        regions.triangle_region.push(region);
    }

    Ok(regions)
}
