mod app;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use depgraph_view::config::LayoutConfig;
use tracing_subscriber::EnvFilter;

use crate::app::{GraphSource, GraphViewerApp};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph JSON file. The bundled sample graph is shown when omitted.
    #[arg(long)]
    graph: Option<PathBuf>,

    /// Layout config JSON with optional `forces`, `simulation` and `viewport` sections.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 1440.0)]
    width: f32,

    #[arg(long, default_value_t = 920.0)]
    height: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => LayoutConfig::load(path)?,
        None => LayoutConfig::default(),
    };
    let source = args.graph.map_or(GraphSource::Sample, GraphSource::File);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width.max(320.0), args.height.max(240.0)]),
        ..Default::default()
    };

    eframe::run_native(
        "depgraph-view",
        options,
        Box::new(move |cc| Ok(Box::new(GraphViewerApp::new(cc, source, config)))),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
