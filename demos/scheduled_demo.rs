//! Budgeted scheduling demo for meshkit
//!
//! Queues one pipeline run per mesh and drains the queue in 16 ms ticks,
//! the way a host would spread the work over frames.

mod shapes;

use meshkit_core::IndexedMesh;
use meshkit_pipeline::{Pipeline, PipelineConfig, TaskQueue};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const FRAME_BUDGET: Duration = Duration::from_millis(16);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let pipeline = Pipeline::new(PipelineConfig::default())?;
    let mut queue = TaskQueue::new();

    let meshes: Vec<Arc<Mutex<IndexedMesh>>> = (0..6u64)
        .map(|seed| shapes::wavy_grid(12 + seed as usize * 4, seed).map(|m| Arc::new(Mutex::new(m))))
        .collect::<meshkit_core::Result<_>>()?;

    for (index, mesh) in meshes.iter().enumerate() {
        pipeline.schedule(&mut queue, Arc::clone(mesh), move |result| match result {
            Ok(report) => info!(mesh = index, "{}", report),
            Err(e) => warn!(mesh = index, "pipeline failed: {}", e),
        });
    }

    let mut frame = 0;
    while !queue.is_empty() {
        let ran = queue.run_for(FRAME_BUDGET);
        println!("frame {}: ran {} task(s), {} pending", frame, ran, queue.len());
        frame += 1;
    }

    for (index, mesh) in meshes.iter().enumerate() {
        let mesh = mesh
            .lock()
            .map_err(|_| anyhow::anyhow!("mesh {} lock poisoned", index))?;
        println!(
            "mesh {}: {} triangles, {} vertices",
            index,
            mesh.triangle_count(),
            mesh.vertex_count()
        );
    }

    Ok(())
}
