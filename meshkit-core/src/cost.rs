//! Weighted attribute-difference cost between two vertices
//!
//! The same comparator ranks decimation candidates and filters weld
//! candidates.

use crate::error::{Error, Result};
use crate::point::*;
use crate::vertex::Vertex;
use serde::{Deserialize, Serialize};

/// Weights of the terms in [`weighted_cost`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostWeights {
    /// Weight of the squared position distance
    pub edge_length: f32,
    /// Weight of the squared difference of the normalized normals
    pub normal_difference: f32,
    /// Weight of the squared RGBA difference
    pub color_difference: f32,
    /// Weight of the squared UV difference
    pub uv_difference: f32,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            edge_length: 0.01,
            normal_difference: 1.0,
            color_difference: 10.0,
            uv_difference: 0.0,
        }
    }
}

impl CostWeights {
    /// Every non-UV weight set to one
    pub fn uniform() -> Self {
        Self {
            edge_length: 1.0,
            normal_difference: 1.0,
            color_difference: 1.0,
            uv_difference: 0.0,
        }
    }

    /// Only the squared edge length counts
    pub fn edge_length_only() -> Self {
        Self {
            edge_length: 1.0,
            normal_difference: 0.0,
            color_difference: 0.0,
            uv_difference: 0.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("edge_length", self.edge_length),
            ("normal_difference", self.normal_difference),
            ("color_difference", self.color_difference),
            ("uv_difference", self.uv_difference),
        ];
        for (name, w) in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "cost weight '{}' must be finite and non-negative, got {}",
                    name, w
                )));
            }
        }
        Ok(())
    }
}

/// Sum of squared RGBA channel differences
#[inline]
pub fn color_sqr_difference(c0: &Color, c1: &Color) -> f32 {
    (c0 - c1).norm_squared()
}

/// Weighted sum of the squared position, normal, color and UV differences.
///
/// Normals are normalized before differencing; zero normals stay zero.
pub fn weighted_cost(v0: &Vertex, v1: &Vertex, weights: &CostWeights) -> f32 {
    let length_sqr = (v0.position - v1.position).norm_squared();
    let normal_sqr = (normalize_or_zero(&v0.normal) - normalize_or_zero(&v1.normal)).norm_squared();
    let color_sqr = color_sqr_difference(&v0.color, &v1.color);
    let uv_sqr = (v0.uv - v1.uv).norm_squared();

    weights.edge_length * length_sqr
        + weights.normal_difference * normal_sqr
        + weights.color_difference * color_sqr
        + weights.uv_difference * uv_sqr
}
