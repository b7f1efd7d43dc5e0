//! Mesh tessellation
//!
//! Splits every triangle larger than an area threshold into four, repeating
//! until no triangle qualifies or the iteration budget runs out.

pub mod tessellate;

pub use tessellate::*;
