//! Core data structures and traits for meshkit
//!
//! This crate provides the mesh representation shared by every editing pass:
//! the vertex attribute store, triangles and edges, edge connectivity, the
//! weighted cost model and the pass trait.

pub mod attributes;
pub mod connectivity;
pub mod cost;
pub mod error;
pub mod mesh;
pub mod point;
pub mod report;
pub mod traits;
pub mod triangle;
pub mod vertex;

pub use attributes::*;
pub use connectivity::*;
pub use cost::*;
pub use error::*;
pub use mesh::*;
pub use point::*;
pub use report::*;
pub use traits::*;
pub use triangle::*;
pub use vertex::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Vector4};
