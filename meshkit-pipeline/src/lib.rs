//! Pipeline driver for meshkit
//!
//! Runs the configured passes over a mesh in a fixed order:
//! tessellation, decimation, welding, then optional orphan removal.
//! A [`TaskQueue`] lets a host spread pipeline runs over frames with a
//! wall-clock budget per tick.

pub mod config;
pub mod pipeline;
pub mod schedule;

pub use config::*;
pub use pipeline::*;
pub use schedule::*;

pub use meshkit_core::{Error, IndexedMesh, MeshPass, PassReport, Result};
