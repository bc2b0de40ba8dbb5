mod app;
mod arrows;
mod config;
mod icon;
mod mesh;
mod util;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::arrows::ArrowQueue;
use crate::config::VisualizerConfig;
use crate::mesh::{SharedMesh, Simulation, TrafficDriver};

const WINDOW_TITLE: &str = "ULSR Simulation";

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON file with visualizer settings
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    nodes: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    arrow_capacity: Option<usize>,

    #[arg(long)]
    icon: Option<PathBuf>,

    /// Milliseconds between generated traffic bursts
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Do not generate demo traffic
    #[arg(long)]
    no_traffic: bool,
}

impl Args {
    fn into_config(self) -> Result<VisualizerConfig> {
        let mut config = match &self.config {
            Some(path) => VisualizerConfig::from_file(path)?,
            None => VisualizerConfig::default(),
        };

        if let Some(nodes) = self.nodes {
            config.node_count = nodes;
            config.nodes = None;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(capacity) = self.arrow_capacity {
            config.arrow_capacity = capacity;
        }
        if let Some(icon) = self.icon {
            config.icon_path = icon;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.traffic_tick_ms = tick_ms;
        }
        if self.no_traffic {
            config.traffic = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Args::parse().into_config()?;

    let mesh = Arc::new(SharedMesh::from_config(&config));
    let arrows = ArrowQueue::new(config.arrow_capacity);
    tracing::info!(
        nodes = mesh.node_count(),
        width = config.width,
        height = config.height,
        range = mesh.max_broadcast_range(),
        target = ?mesh.target_position(),
        arrow_capacity = arrows.capacity(),
        "starting visualizer"
    );

    let size = [config.width as f32, config.height as f32];
    let mut viewport = eframe::egui::ViewportBuilder::default()
        .with_title(WINDOW_TITLE)
        .with_inner_size(size)
        .with_min_inner_size(size)
        .with_max_inner_size(size)
        .with_resizable(false);
    if let Some(icon) = icon::load_icon(&config.icon_path) {
        viewport = viewport.with_icon(icon);
    }
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| {
            let traffic = config.traffic.then(|| {
                TrafficDriver::spawn(
                    Arc::clone(&mesh),
                    arrows.clone(),
                    Duration::from_millis(config.traffic_tick_ms.max(1)),
                    config.seed,
                )
            });
            Ok(Box::new(app::VisualizerApp::new(
                cc, &config, mesh, arrows, traffic,
            )))
        }),
    )
    .map_err(|error| {
        tracing::error!("window initialization failed: {error}");
        anyhow!("failed to run the visualizer window: {error}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["mesh-visor"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn cli_overrides_defaults() {
        let config = args(&["--nodes", "7", "--arrow-capacity", "8", "--no-traffic"])
            .into_config()
            .expect("valid config");
        assert_eq!(config.node_count, 7);
        assert_eq!(config.arrow_capacity, 8);
        assert!(!config.traffic);
    }

    #[test]
    fn cli_rejects_invalid_values() {
        assert!(args(&["--arrow-capacity", "0"]).into_config().is_err());
        assert!(args(&["--nodes", "0"]).into_config().is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(
            args(&["--config", "does/not/exist.json"])
                .into_config()
                .is_err()
        );
    }
}
