//! Shared state of the mesh simulation as seen by the visualizer.
//!
//! The simulation owns node and target positions. The visualizer only reads
//! them through [`Simulation::snapshot`] and moves nodes through
//! [`Simulation::relocate_node`].

mod layout;
mod traffic;

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::config::VisualizerConfig;

pub use layout::{Bounds, drawable_bounds, scatter_nodes};
pub use traffic::TrafficDriver;

const LAYOUT_MARGIN: f32 = 30.0;

/// A point in simulation space: origin bottom-left, Y grows upwards.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Coord {
    pub x: f32,
    pub y: f32,
}

impl Coord {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Coord) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<[f32; 2]> for Coord {
    fn from([x, y]: [f32; 2]) -> Self {
        Self::new(x, y)
    }
}

/// Consistent copy of every position, taken under one lock.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshSnapshot {
    pub nodes: Vec<Coord>,
    pub target: Coord,
}

impl MeshSnapshot {
    /// Position of a 1-based node id.
    pub fn node_by_id(&self, node_id: usize) -> Option<Coord> {
        node_id
            .checked_sub(1)
            .and_then(|index| self.nodes.get(index).copied())
    }
}

/// What the visualizer needs from the simulation engine.
pub trait Simulation: Send + Sync {
    fn node_count(&self) -> usize;

    fn node_position(&self, index: usize) -> Option<Coord>;

    fn target_position(&self) -> Coord;

    /// Moves the node with 1-based id `node_id`. Returns `false` for an
    /// unknown id.
    fn relocate_node(&self, node_id: usize, position: Coord) -> bool;

    fn max_broadcast_range(&self) -> f32;

    fn snapshot(&self) -> MeshSnapshot;

    fn set_mode(&self, _mode: usize) {}
}

#[derive(Debug)]
struct Positions {
    nodes: Vec<Coord>,
    target: Coord,
}

/// In-process simulation state shared between the render loop and the
/// traffic driver thread.
#[derive(Debug)]
pub struct SharedMesh {
    positions: RwLock<Positions>,
    max_broadcast_range: f32,
    mode: AtomicUsize,
    bounds: Bounds,
}

impl SharedMesh {
    pub fn new(nodes: Vec<Coord>, target: Coord, max_broadcast_range: f32, bounds: Bounds) -> Self {
        Self {
            positions: RwLock::new(Positions { nodes, target }),
            max_broadcast_range,
            mode: AtomicUsize::new(0),
            bounds,
        }
    }

    pub fn from_config(config: &VisualizerConfig) -> Self {
        let bounds = drawable_bounds(
            config.width,
            config.height,
            config.toolbar_height,
            LAYOUT_MARGIN,
        );
        let nodes = match &config.nodes {
            Some(explicit) => explicit.iter().copied().map(Coord::from).collect(),
            None => scatter_nodes(
                config.node_count,
                bounds,
                config.seed,
                config.node_hit_half_extent * 4.0,
            ),
        };
        let target = config.target.map_or_else(|| bounds.center(), Coord::from);

        for (index, node) in nodes.iter().enumerate() {
            if !bounds.contains(*node) {
                tracing::warn!(
                    node_id = index + 1,
                    x = node.x,
                    y = node.y,
                    "node placed outside the drawable area"
                );
            }
        }

        Self::new(nodes, target, config.max_broadcast_range, bounds)
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn mode(&self) -> usize {
        self.mode.load(Ordering::Relaxed)
    }

    pub fn set_target(&self, target: Coord) {
        self.positions.write().target = target;
    }
}

impl Simulation for SharedMesh {
    fn node_count(&self) -> usize {
        self.positions.read().nodes.len()
    }

    fn node_position(&self, index: usize) -> Option<Coord> {
        self.positions.read().nodes.get(index).copied()
    }

    fn target_position(&self) -> Coord {
        self.positions.read().target
    }

    fn relocate_node(&self, node_id: usize, position: Coord) -> bool {
        let mut positions = self.positions.write();
        let Some(node) = node_id
            .checked_sub(1)
            .and_then(|index| positions.nodes.get_mut(index))
        else {
            tracing::debug!(node_id, "ignoring relocate for unknown node");
            return false;
        };
        *node = position;
        true
    }

    fn max_broadcast_range(&self) -> f32 {
        self.max_broadcast_range
    }

    fn snapshot(&self) -> MeshSnapshot {
        let positions = self.positions.read();
        MeshSnapshot {
            nodes: positions.nodes.clone(),
            target: positions.target,
        }
    }

    fn set_mode(&self, mode: usize) {
        self.mode.store(mode, Ordering::Relaxed);
    }
}
