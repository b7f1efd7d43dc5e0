//! Core traits for meshkit

use crate::{error::Result, mesh::IndexedMesh, report::PassReport};

/// A mesh editing pass that mutates a mesh in place.
///
/// A pass either completes or returns a contract violation without touching
/// the mesh; there is no partial result.
pub trait MeshPass {
    /// Short name used in logs and reports
    fn name(&self) -> &'static str;

    /// Run the pass over `mesh`
    fn apply(&self, mesh: &mut IndexedMesh) -> Result<PassReport>;
}

impl<P: MeshPass + ?Sized> MeshPass for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn apply(&self, mesh: &mut IndexedMesh) -> Result<PassReport> {
        (**self).apply(mesh)
    }
}
