//! Mesh simplification passes
//!
//! This crate provides the passes that reduce mesh complexity:
//! - Connectivity clustering (and an optional planar regions pre-pass)
//! - Greedy edge-collapse decimation, run per cluster
//! - Vertex welding of near-identical vertices

pub mod clustering;
pub mod decimate;
pub mod parallel;
pub mod weld;

pub use clustering::*;
pub use decimate::*;
pub use parallel::*;
pub use weld::*;
