//! Midpoint subdivision driven by triangle area
//!
//! A qualifying triangle `(a, b, c)` with edge midpoints `ab`, `bc`, `ca` is
//! replaced in place by `(ab, b, bc)`, `(bc, c, ca)`, `(ca, a, ab)` and the
//! central `(ab, bc, ca)`. Midpoints are shared between neighbours that split
//! in the same pass, so subdivision does not open seams.

use meshkit_core::{Edge, Error, IndexedMesh, MeshPass, PassReport, Result, Triangle};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Tessellation settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TessellationConfig {
    /// Maximum number of subdivision passes
    pub iterations: usize,
    /// Triangles with an area above this are split
    pub min_triangle_area: f32,
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self {
            iterations: 1,
            min_triangle_area: 0.0,
        }
    }
}

impl TessellationConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.min_triangle_area.is_finite() || self.min_triangle_area < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "min_triangle_area must be finite and non-negative, got {}",
                self.min_triangle_area
            )));
        }
        Ok(())
    }
}

/// Index of the midpoint of `{a, b}`, created on first use in a pass
fn midpoint(
    mesh: &mut IndexedMesh,
    cache: &mut HashMap<Edge, usize>,
    a: usize,
    b: usize,
) -> usize {
    let edge = Edge::new(a, b);
    if let Some(&index) = cache.get(&edge) {
        return index;
    }
    let vertex = mesh.attributes.interpolate(edge.lower(), edge.higher(), 0.5);
    let index = mesh.attributes.push(&vertex);
    cache.insert(edge, index);
    index
}

/// Area-driven midpoint tessellation pass
#[derive(Debug, Clone, Default)]
pub struct Tessellator {
    pub config: TessellationConfig,
}

impl Tessellator {
    pub fn new(config: TessellationConfig) -> Self {
        Self { config }
    }

    /// Subdivide every qualifying triangle once. Returns the number split.
    fn subdivide_pass(&self, mesh: &mut IndexedMesh) -> usize {
        let split: Vec<bool> = {
            let positions = mesh.attributes.positions();
            mesh.triangles
                .iter()
                .map(|t| t.area(positions) > self.config.min_triangle_area)
                .collect()
        };
        let count = split.iter().filter(|&&s| s).count();
        if count == 0 {
            return 0;
        }

        let mut midpoints: HashMap<Edge, usize> = HashMap::with_capacity(count * 3);
        let source = std::mem::take(&mut mesh.triangles);
        let mut triangles = Vec::with_capacity(source.len() + count * 3);
        for (triangle, &subdivide) in source.iter().zip(&split) {
            if !subdivide {
                triangles.push(*triangle);
                continue;
            }
            let [a, b, c] = triangle.indices();
            let ab = midpoint(mesh, &mut midpoints, a, b);
            let bc = midpoint(mesh, &mut midpoints, b, c);
            let ca = midpoint(mesh, &mut midpoints, c, a);
            triangles.extend([
                Triangle::new(ab, b, bc),
                Triangle::new(bc, c, ca),
                Triangle::new(ca, a, ab),
                Triangle::new(ab, bc, ca),
            ]);
        }
        mesh.triangles = triangles;

        debug!(
            split = count,
            midpoints = midpoints.len(),
            triangles = mesh.triangle_count(),
            "tessellation iteration"
        );
        count
    }
}

impl MeshPass for Tessellator {
    fn name(&self) -> &'static str {
        "tessellation"
    }

    fn apply(&self, mesh: &mut IndexedMesh) -> Result<PassReport> {
        mesh.validate()?;
        self.config.validate()?;

        let mut report = PassReport::begin(self.name(), mesh);
        info!(
            triangles = mesh.triangle_count(),
            iterations = self.config.iterations,
            min_triangle_area = self.config.min_triangle_area,
            "tessellation started"
        );

        for _ in 0..self.config.iterations {
            report.iterations += 1;
            let split = self.subdivide_pass(mesh);
            if split == 0 {
                break;
            }
            report.operations += split;
        }

        let report = report.finish(mesh);
        if report.degenerate_triangles > 0 {
            warn!(
                degenerate = report.degenerate_triangles,
                "tessellation input contains degenerate triangles"
            );
        }
        info!(
            subdivisions = report.operations,
            triangles = report.triangles_after,
            vertices = report.vertices_after,
            "tessellation finished"
        );
        Ok(report)
    }
}
