//! Pipeline driver

use crate::config::PipelineConfig;
use crate::schedule::TaskQueue;
use itertools::Itertools;
use meshkit_core::{Error, IndexedMesh, MeshPass, PassReport, Result};
use meshkit_simplification::{init_thread_pool, Decimator, VertexWelder};
use meshkit_tessellation::Tessellator;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{info, info_span};

/// Reports of every pass a pipeline run executed, in order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub passes: Vec<PassReport>,
    /// Vertices dropped by the final orphan removal
    pub unreferenced_removed: usize,
    pub elapsed: Duration,
}

impl PipelineReport {
    /// Report of the named pass, if it ran
    pub fn pass(&self, name: &str) -> Option<&PassReport> {
        self.passes.iter().find(|p| p.pass == name)
    }

    /// Collapses, merges and subdivisions across all passes
    pub fn total_operations(&self) -> usize {
        self.passes.iter().map(|p| p.operations).sum()
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}; {} unreferenced vertices removed in {:.2?}",
            self.passes.iter().join("; "),
            self.unreferenced_removed,
            self.elapsed
        )
    }
}

/// Runs the configured passes over a mesh
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline, rejecting invalid configuration up front
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The enabled passes in execution order
    pub fn passes(&self) -> Vec<Box<dyn MeshPass + Send + Sync>> {
        let parallel = self.config.parallel;
        let mut passes: Vec<Box<dyn MeshPass + Send + Sync>> = Vec::new();
        if let Some(config) = self.config.tessellation {
            passes.push(Box::new(Tessellator::new(config)));
        }
        if let Some(config) = self.config.decimation {
            passes.push(Box::new(Decimator::new(config).with_parallel(parallel)));
        }
        if let Some(config) = self.config.welding {
            passes.push(Box::new(VertexWelder::new(config).with_parallel(parallel)));
        }
        passes
    }

    /// Run every enabled pass over `mesh`.
    ///
    /// A contract violation is returned before any pass touches the mesh.
    pub fn run(&self, mesh: &mut IndexedMesh) -> Result<PipelineReport> {
        mesh.validate()?;
        if self.config.parallel.enabled && self.config.parallel.num_threads.is_some() {
            init_thread_pool(self.config.parallel.num_threads)?;
        }

        let start = Instant::now();
        info!(
            triangles = mesh.triangle_count(),
            vertices = mesh.vertex_count(),
            "pipeline started"
        );

        let mut passes = Vec::new();
        for pass in self.passes() {
            let span = info_span!("stage", pass = pass.name());
            let _enter = span.enter();
            let report = pass.apply(mesh)?;
            info!("{}", report);
            passes.push(report);
        }

        let unreferenced_removed = if self.config.remove_unreferenced {
            mesh.remove_unreferenced_vertices()
        } else {
            0
        };

        let report = PipelineReport {
            passes,
            unreferenced_removed,
            elapsed: start.elapsed(),
        };
        info!(
            triangles = mesh.triangle_count(),
            vertices = mesh.vertex_count(),
            unreferenced_removed,
            "pipeline finished in {:.2?}",
            report.elapsed
        );
        Ok(report)
    }

    /// Enqueue a run over a shared mesh; `sink` receives the outcome when the
    /// queue gets to it.
    pub fn schedule<F>(&self, queue: &mut TaskQueue, mesh: Arc<Mutex<IndexedMesh>>, sink: F)
    where
        F: FnOnce(Result<PipelineReport>) + Send + 'static,
    {
        let pipeline = self.clone();
        queue.schedule(move || {
            let result = match mesh.lock() {
                Ok(mut guard) => pipeline.run(&mut guard),
                Err(_) => Err(Error::InvalidData("mesh lock poisoned".to_string())),
            };
            sink(result);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshkit_core::{Point3f, Triangle, VertexAttributes};
    use meshkit_simplification::{DecimationConfig, WeldConfig};
    use meshkit_tessellation::TessellationConfig;

    fn make_quad() -> IndexedMesh {
        let attributes = VertexAttributes::new(vec![
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(1.0, 1.0, 0.0),
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
        ]);
        IndexedMesh::new(attributes, vec![Triangle::new(0, 2, 1), Triangle::new(1, 2, 3)])
            .unwrap()
    }

    #[test]
    fn test_pass_order() {
        let config = PipelineConfig::default().with_tessellation(TessellationConfig::default());
        let pipeline = Pipeline::new(config).unwrap();
        let names: Vec<_> = pipeline.passes().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["tessellation", "decimation", "welding"]);

        let empty = Pipeline::new(PipelineConfig::empty()).unwrap();
        assert!(empty.passes().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PipelineConfig::empty().with_decimation(DecimationConfig {
            max_total_weight: f32::NAN,
            ..DecimationConfig::default()
        });
        assert!(matches!(Pipeline::new(config), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_run_reports_each_pass() {
        let config = PipelineConfig::empty()
            .with_tessellation(TessellationConfig {
                iterations: 1,
                min_triangle_area: 0.0,
            })
            .with_welding(WeldConfig::default());
        let pipeline = Pipeline::new(config).unwrap();

        let mut mesh = make_quad();
        let report = pipeline.run(&mut mesh).unwrap();
        assert_eq!(report.passes.len(), 2);
        assert_eq!(report.pass("tessellation").unwrap().operations, 2);
        // Shared midpoints leave nothing to weld
        assert_eq!(report.pass("welding").unwrap().operations, 0);
        assert!(report.pass("decimation").is_none());
        assert_eq!(report.total_operations(), 2);
        assert_eq!(mesh.triangle_count(), 8);
        assert!(report.to_string().contains("tessellation: 2 → 8 triangles"));
    }

    #[test]
    fn test_invalid_mesh_untouched() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let mut mesh = make_quad();
        mesh.triangles.push(Triangle::new(0, 1, 7));
        let before = mesh.clone();
        assert!(pipeline.run(&mut mesh).is_err());
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_scheduled_run() {
        let pipeline = Pipeline::new(
            PipelineConfig::empty().with_tessellation(TessellationConfig::default()),
        )
        .unwrap();
        let mesh = Arc::new(Mutex::new(make_quad()));
        let results = Arc::new(Mutex::new(Vec::new()));

        let mut queue = TaskQueue::new();
        for _ in 0..2 {
            let results = Arc::clone(&results);
            pipeline.schedule(&mut queue, Arc::clone(&mesh), move |result| {
                results.lock().unwrap().push(result.map(|r| r.total_operations()));
            });
        }
        assert_eq!(queue.len(), 2);
        assert!(results.lock().unwrap().is_empty());

        queue.run_all();
        let results = results.lock().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(*results[0].as_ref().unwrap(), 2);
        assert_eq!(*results[1].as_ref().unwrap(), 8);
        assert_eq!(mesh.lock().unwrap().triangle_count(), 32);
    }
}
