//! Per-vertex attribute bundle and attribute interpolation

use crate::point::*;
use bytemuck::{Pod, Zeroable};
use nalgebra::Unit;
use serde::{Deserialize, Serialize};

/// Directions closer than this to (anti)parallel fall back to normalized lerp.
const SLERP_EPSILON: f32 = 1e-6;

/// All attributes of a single vertex.
///
/// Attributes that are absent for the whole mesh read as zero (transparent
/// black for colors) and are never written back into the store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Vertex {
    pub position: Point3f,
    pub normal: Vector3f,
    pub color: Color,
    /// Tangent direction in `xyz`, handedness in `w`
    pub tangent: Vector4f,
    pub uv: Vector4f,
}

unsafe impl Pod for Vertex {}
unsafe impl Zeroable for Vertex {}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Point3f::origin(),
            normal: Vector3f::zeros(),
            color: Color::zeros(),
            tangent: Vector4f::zeros(),
            uv: Vector4f::zeros(),
        }
    }
}

impl Vertex {
    /// Create a vertex with only a position set
    pub fn from_position(position: Point3f) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_normal(mut self, normal: Vector3f) -> Self {
        self.normal = normal;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_tangent(mut self, tangent: Vector4f) -> Self {
        self.tangent = tangent;
        self
    }

    pub fn with_uv(mut self, uv: Vector4f) -> Self {
        self.uv = uv;
        self
    }

    /// Interpolate every attribute between `a` (t = 0) and `b` (t = 1).
    ///
    /// Position, color and UV are interpolated linearly. Normal and tangent
    /// direction use great-circle interpolation and come out unit length;
    /// the tangent handedness `w` is interpolated linearly on its own.
    /// Identical inputs come back unchanged.
    pub fn interpolate(a: &Vertex, b: &Vertex, t: f32) -> Vertex {
        if a == b {
            return *a;
        }
        Vertex {
            position: a.position.coords.lerp(&b.position.coords, t).into(),
            normal: slerp_direction(&a.normal, &b.normal, t),
            color: a.color.lerp(&b.color, t),
            tangent: lerp_tangent(&a.tangent, &b.tangent, t),
            uv: a.uv.lerp(&b.uv, t),
        }
    }
}

/// Spherical interpolation of two directions, renormalized.
///
/// Zero-length inputs (absent normals) interpolate linearly, so two zero
/// vectors stay zero.
pub fn slerp_direction(a: &Vector3f, b: &Vector3f, t: f32) -> Vector3f {
    let (Some(ua), Some(ub)) = (
        Unit::try_new(*a, NORMALIZE_EPSILON),
        Unit::try_new(*b, NORMALIZE_EPSILON),
    ) else {
        return normalize_or_zero(&a.lerp(b, t));
    };

    if let Some(dir) = ua.try_slerp(&ub, t, SLERP_EPSILON) {
        return dir.into_inner();
    }

    // Nearly parallel or exactly opposite
    let lerped = ua.as_ref().lerp(ub.as_ref(), t);
    match lerped.try_normalize(NORMALIZE_EPSILON) {
        Some(n) => n,
        None if t < 0.5 => ua.into_inner(),
        None => ub.into_inner(),
    }
}

/// Interpolate a tangent: direction spherically, handedness linearly.
pub fn lerp_tangent(a: &Vector4f, b: &Vector4f, t: f32) -> Vector4f {
    let dir = slerp_direction(&a.xyz(), &b.xyz(), t);
    let w = a.w + (b.w - a.w) * t;
    Vector4f::new(dir.x, dir.y, dir.z, w)
}
