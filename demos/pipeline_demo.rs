//! Pipeline demo for meshkit
//!
//! Builds a wavy grid with a split seam, runs the configured pipeline over
//! it and prints the per-pass reports. Set `RUST_LOG=debug` to see every
//! iteration.

mod shapes;

use anyhow::Context;
use clap::Parser;
use meshkit_pipeline::{Pipeline, PipelineConfig};
use meshkit_tessellation::TessellationConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pipeline_demo", about = "Run the meshkit pipeline over a generated grid")]
struct Args {
    /// JSON pipeline configuration; defaults are used when omitted
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Vertices per grid side
    #[arg(short, long, default_value_t = 24)]
    size: usize,

    /// Subdivide triangles larger than this area before decimating
    #[arg(long)]
    tessellate_above: Option<f32>,

    /// Seed for the height jitter
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.size >= 2, "grid size must be at least 2, got {}", args.size);

    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(area) = args.tessellate_above {
        config = config.with_tessellation(TessellationConfig {
            iterations: 1,
            min_triangle_area: area,
        });
    }

    if args.print_config {
        println!("{}", config.to_json_string()?);
        return Ok(());
    }

    let mut mesh = shapes::wavy_grid(args.size, args.seed)?;
    info!(
        triangles = mesh.triangle_count(),
        vertices = mesh.vertex_count(),
        area = mesh.surface_area(),
        "generated grid"
    );

    let pipeline = Pipeline::new(config)?;
    let report = pipeline.run(&mut mesh)?;

    println!("meshkit pipeline demo");
    println!("=====================");
    for pass in &report.passes {
        println!("{}", pass);
    }
    println!(
        "Removed {} unreferenced vertices in {:.2?}",
        report.unreferenced_removed, report.elapsed
    );
    println!(
        "Result: {} triangles, {} vertices, area {:.3}",
        mesh.triangle_count(),
        mesh.vertex_count(),
        mesh.surface_area()
    );
    if mesh.degenerate_triangle_count() > 0 {
        println!("Warning: {} degenerate triangles", mesh.degenerate_triangle_count());
    }

    Ok(())
}
