//! Scalar and vector types shared by every pass

use nalgebra::{Point3, Vector3, Vector4};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A 4D vector with floating point components (tangents, UVs)
pub type Vector4f = Vector4<f32>;

/// Linear RGBA color with channels in `[0, 1]`
pub type Color = Vector4<f32>;

/// Lengths below this are treated as zero when normalizing.
pub const NORMALIZE_EPSILON: f32 = 1e-12;

/// Normalize `v`, returning the zero vector when it has no direction.
#[inline]
pub fn normalize_or_zero(v: &Vector3f) -> Vector3f {
    v.try_normalize(NORMALIZE_EPSILON)
        .unwrap_or_else(Vector3f::zeros)
}

/// Area of the triangle spanned by three points.
#[inline]
pub fn triangle_area(v0: &Point3f, v1: &Point3f, v2: &Point3f) -> f32 {
    (v0 - v1).cross(&(v0 - v2)).magnitude() * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_or_zero() {
        let n = normalize_or_zero(&Vector3f::new(0.0, 3.0, 4.0));
        assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-6);
        assert_eq!(normalize_or_zero(&Vector3f::zeros()), Vector3f::zeros());
    }

    #[test]
    fn test_triangle_area() {
        let area = triangle_area(
            &Point3f::new(0.0, 0.0, 0.0),
            &Point3f::new(2.0, 0.0, 0.0),
            &Point3f::new(0.0, 2.0, 0.0),
        );
        assert_relative_eq!(area, 2.0);
    }
}
