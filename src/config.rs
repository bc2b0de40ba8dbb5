use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

/// Reasons a configuration is rejected before the window is created.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("simulation resolution must be non-zero, got {width}x{height}")]
    EmptyResolution { width: u32, height: u32 },

    #[error("toolbar height {toolbar_height} does not fit in a window {height} pixels tall")]
    ToolbarTooTall { toolbar_height: u32, height: u32 },

    #[error("at least one toolbar item is required")]
    NoToolbarItems,

    #[error("arrow queue capacity must be at least 1")]
    ZeroArrowCapacity,

    #[error("the mesh needs at least one node")]
    NoNodes,

    #[error("broadcast range must be positive, got {0}")]
    InvalidRange(f32),

    #[error("ring speed must not be negative, got {0}")]
    NegativeRingSpeed(f32),

    #[error("starting ring radius {radius} must not exceed the broadcast range {range}")]
    StartingRadiusOutOfRange { radius: f32, range: f32 },

    #[error("node hit box half extent must be positive, got {0}")]
    InvalidHitExtent(f32),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    pub width: u32,
    pub height: u32,
    pub toolbar_height: u32,
    pub toolbar_items: Vec<String>,
    pub node_count: usize,
    pub max_broadcast_range: f32,
    pub starting_ring_radius: f32,
    pub ring_speed: f32,
    pub node_hit_half_extent: f32,
    pub arrow_capacity: usize,
    pub icon_path: PathBuf,
    pub seed: u64,
    pub traffic: bool,
    pub traffic_tick_ms: u64,
    /// Explicit node positions in simulation space; overrides `node_count`.
    pub nodes: Option<Vec<[f32; 2]>>,
    pub target: Option<[f32; 2]>,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            toolbar_height: 40,
            toolbar_items: vec!["Route".to_owned(), "Broadcast".to_owned(), "Pause".to_owned()],
            node_count: 12,
            max_broadcast_range: 200.0,
            starting_ring_radius: 0.0,
            ring_speed: 60.0,
            node_hit_half_extent: 10.0,
            arrow_capacity: 32,
            icon_path: PathBuf::from("assets/icon.png"),
            seed: 1,
            traffic: true,
            traffic_tick_ms: 600,
            nodes: None,
            target: None,
        }
    }
}

impl VisualizerConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("config is not valid JSON for this visualizer")
    }

    pub fn effective_node_count(&self) -> usize {
        self.nodes.as_ref().map_or(self.node_count, Vec::len)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyResolution {
                width: self.width,
                height: self.height,
            });
        }
        if self.toolbar_height >= self.height {
            return Err(ConfigError::ToolbarTooTall {
                toolbar_height: self.toolbar_height,
                height: self.height,
            });
        }
        if self.toolbar_items.is_empty() {
            return Err(ConfigError::NoToolbarItems);
        }
        if self.arrow_capacity == 0 {
            return Err(ConfigError::ZeroArrowCapacity);
        }
        if self.effective_node_count() == 0 {
            return Err(ConfigError::NoNodes);
        }
        if self.max_broadcast_range.is_nan() || self.max_broadcast_range <= 0.0 {
            return Err(ConfigError::InvalidRange(self.max_broadcast_range));
        }
        if self.ring_speed < 0.0 {
            return Err(ConfigError::NegativeRingSpeed(self.ring_speed));
        }
        if self.starting_ring_radius.is_nan() || self.starting_ring_radius > self.max_broadcast_range {
            return Err(ConfigError::StartingRadiusOutOfRange {
                radius: self.starting_ring_radius,
                range: self.max_broadcast_range,
            });
        }
        if self.node_hit_half_extent.is_nan() || self.node_hit_half_extent <= 0.0 {
            return Err(ConfigError::InvalidHitExtent(self.node_hit_half_extent));
        }
        Ok(())
    }
}
