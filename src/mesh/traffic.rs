use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::arrows::{ArrowEvent, ArrowQueue, Direction};
use crate::util::Lcg;

use super::{Coord, MeshSnapshot, SharedMesh, Simulation};

const TARGET_ORBIT_STEP: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TrafficMode {
    Route,
    Broadcast,
    Pause,
}

impl TrafficMode {
    fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Route,
            1 => Self::Broadcast,
            _ => Self::Pause,
        }
    }
}

/// Per-tick traffic generation, independent of the worker thread.
struct TrafficState {
    rng: Lcg,
    orbit_angle: f32,
}

impl TrafficState {
    fn new(seed: u64) -> Self {
        Self {
            rng: Lcg::new(seed),
            orbit_angle: 0.0,
        }
    }

    fn step(&mut self, mesh: &SharedMesh, queue: &ArrowQueue) {
        self.advance_target(mesh);

        let snapshot = mesh.snapshot();
        let range = mesh.max_broadcast_range();
        match TrafficMode::from_index(mesh.mode()) {
            TrafficMode::Route => {
                for event in self.route_events(&snapshot, range) {
                    queue.push(event);
                }
            }
            TrafficMode::Broadcast => {
                for event in self.broadcast_events(&snapshot, range) {
                    queue.push(event);
                }
            }
            TrafficMode::Pause => {}
        }
    }

    fn advance_target(&mut self, mesh: &SharedMesh) {
        let bounds = mesh.bounds();
        let center = bounds.center();
        let radius = (bounds.max.x - bounds.min.x).min(bounds.max.y - bounds.min.y) * 0.3;
        self.orbit_angle = (self.orbit_angle + TARGET_ORBIT_STEP) % std::f32::consts::TAU;
        mesh.set_target(Coord::new(
            center.x + radius * self.orbit_angle.cos(),
            center.y + radius * self.orbit_angle.sin(),
        ));
    }

    /// Greedy walk from a random node toward the node closest to the target,
    /// followed by acknowledgements travelling back along the same path.
    fn route_events(&mut self, snapshot: &MeshSnapshot, range: f32) -> Vec<ArrowEvent> {
        let nodes = &snapshot.nodes;
        let Some(destination) = nearest_node(nodes, snapshot.target) else {
            return Vec::new();
        };
        let source = self.rng.below(nodes.len());
        let path = greedy_path(nodes, source, destination, range);

        let mut events = Vec::with_capacity(path.len().saturating_sub(1) * 2);
        for hop in path.windows(2) {
            events.push(ArrowEvent::new(hop[0] + 1, hop[1] + 1, Direction::Send));
        }
        for hop in path.windows(2).rev() {
            events.push(ArrowEvent::new(hop[1] + 1, hop[0] + 1, Direction::Receive));
        }
        events
    }

    fn broadcast_events(&mut self, snapshot: &MeshSnapshot, range: f32) -> Vec<ArrowEvent> {
        let nodes = &snapshot.nodes;
        if nodes.is_empty() {
            return Vec::new();
        }
        let origin = self.rng.below(nodes.len());
        neighbours(nodes, origin, range)
            .map(|neighbour| ArrowEvent::new(origin + 1, neighbour + 1, Direction::Send))
            .collect()
    }
}

fn nearest_node(nodes: &[Coord], point: Coord) -> Option<usize> {
    nodes
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.distance(point).total_cmp(&b.1.distance(point)))
        .map(|(index, _)| index)
}

fn neighbours(nodes: &[Coord], index: usize, range: f32) -> impl Iterator<Item = usize> + '_ {
    let origin = nodes[index];
    nodes
        .iter()
        .enumerate()
        .filter(move |(other, position)| *other != index && origin.distance(**position) <= range)
        .map(|(other, _)| other)
}

/// Node indices visited by the walk, starting with `source`. Stops at the
/// destination or when no neighbour gets strictly closer to it.
fn greedy_path(nodes: &[Coord], source: usize, destination: usize, range: f32) -> Vec<usize> {
    let mut path = vec![source];
    let mut current = source;
    let goal = nodes[destination];

    while current != destination && path.len() <= nodes.len() {
        let here = nodes[current].distance(goal);
        let next = neighbours(nodes, current, range)
            .filter(|&candidate| nodes[candidate].distance(goal) < here)
            .min_by(|&a, &b| nodes[a].distance(goal).total_cmp(&nodes[b].distance(goal)));

        match next {
            Some(next) => {
                path.push(next);
                current = next;
            }
            None => break,
        }
    }

    path
}

/// Background thread producing arrow events and moving the target, standing in
/// for the routing engine's message-delivery path.
pub struct TrafficDriver {
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TrafficDriver {
    pub fn spawn(mesh: Arc<SharedMesh>, queue: ArrowQueue, tick: Duration, seed: u64) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            tracing::info!(tick_ms = tick.as_millis() as u64, "traffic driver started");
            let mut state = TrafficState::new(seed);
            loop {
                match shutdown_rx.recv_timeout(tick) {
                    Err(RecvTimeoutError::Timeout) => state.step(&mesh, &queue),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            tracing::info!("traffic driver stopped");
        });

        Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }
}

impl Drop for TrafficDriver {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::warn!("traffic driver panicked");
        }
    }
}
