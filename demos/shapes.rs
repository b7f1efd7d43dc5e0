//! Procedural meshes shared by the demos

use meshkit_core::{Color, IndexedMesh, Point3f, Result, Triangle, Vector3f, VertexAttributes};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Wavy height field with per-vertex normals and a color gradient, plus a
/// duplicated seam column so welding has work to do
pub fn wavy_grid(size: usize, seed: u64) -> Result<IndexedMesh> {
    let mut rng = StdRng::seed_from_u64(seed);
    let height = |x: f32, y: f32| (x * 0.7).sin() * (y * 0.5).cos() * 0.5;

    let mut positions = Vec::with_capacity(size * size);
    let mut normals = Vec::with_capacity(size * size);
    let mut colors = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let (fx, fy) = (x as f32, y as f32);
            let z = height(fx, fy) + rng.gen_range(-0.01..0.01);
            positions.push(Point3f::new(fx, fy, z));

            let dx = height(fx + 0.01, fy) - height(fx - 0.01, fy);
            let dy = height(fx, fy + 0.01) - height(fx, fy - 0.01);
            normals.push(Vector3f::new(-dx / 0.02, -dy / 0.02, 1.0).normalize());

            let t = fx / (size - 1) as f32;
            colors.push(Color::new(t, 0.2, 1.0 - t, 1.0));
        }
    }

    // Columns right of the seam use their own copy of the seam vertices
    let seam = size / 2;
    let mut seam_copy = vec![0usize; size];
    for (y, copy) in seam_copy.iter_mut().enumerate() {
        let i = y * size + seam;
        *copy = positions.len();
        positions.push(positions[i]);
        normals.push(normals[i]);
        colors.push(colors[i]);
    }
    let corner = |x: usize, y: usize, right_of_seam: bool| {
        if x == seam && right_of_seam {
            seam_copy[y]
        } else {
            y * size + x
        }
    };

    let mut triangles = Vec::with_capacity((size - 1) * (size - 1) * 2);
    for y in 0..(size - 1) {
        for x in 0..(size - 1) {
            let right = x >= seam;
            let tl = corner(x, y, right);
            let tr = corner(x + 1, y, right);
            let bl = corner(x, y + 1, right);
            let br = corner(x + 1, y + 1, right);
            triangles.push(Triangle::new(tl, bl, tr));
            triangles.push(Triangle::new(tr, bl, br));
        }
    }

    let attributes = VertexAttributes::new(positions)
        .with_normals(normals)?
        .with_colors(colors)?;
    IndexedMesh::new(attributes, triangles)
}
