use eframe::egui::Pos2;

use crate::mesh::Coord;

use super::ViewModel;
use super::render_utils::Projection;
use super::selection::{NodeToggle, find_node};

/// What a single left-button press did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum Dispatch {
    ToolbarItem(usize),
    /// The press landed in the band but past the last item.
    ToolbarOutOfRange(usize),
    Node(NodeToggle),
    Relocate {
        node_id: usize,
        position: Coord,
        applied: bool,
    },
    Nothing,
}

impl ViewModel {
    pub(in crate::app) fn dispatch_press(&mut self, window: Pos2, projection: &Projection) -> Dispatch {
        let local = projection.window_local(window);

        if self.toolbar.contains_y(local.y) {
            let index = self.toolbar.find_item(local.x, projection.width());
            if !self
                .selection
                .select_toolbar_item(index, self.toolbar.len())
            {
                tracing::warn!(
                    index,
                    item_count = self.toolbar.len(),
                    x = local.x,
                    "toolbar press past the last item"
                );
                return Dispatch::ToolbarOutOfRange(index);
            }
            tracing::debug!(index, label = %self.toolbar.items()[index], "toolbar mode selected");
            self.simulation.set_mode(index);
            return Dispatch::ToolbarItem(index);
        }

        let position = projection.window_to_sim(window);
        let nodes = self.simulation.snapshot().nodes;

        if let Some(index) = find_node(&nodes, position, self.node_hit_half_extent) {
            let toggle = self.selection.toggle_node(index);
            tracing::debug!(?toggle, "node selection changed");
            return Dispatch::Node(toggle);
        }

        let Some(selected) = self.selection.selected_node() else {
            return Dispatch::Nothing;
        };

        let node_id = selected + 1;
        let previous = self.simulation.node_position(selected);
        let applied = self.simulation.relocate_node(node_id, position);
        tracing::debug!(
            node_id,
            ?previous,
            x = position.x,
            y = position.y,
            applied,
            "relocate node"
        );
        Dispatch::Relocate {
            node_id,
            position,
            applied,
        }
    }
}

#[cfg(test)]
pub(in crate::app) mod tests {
    use std::sync::Arc;

    use eframe::egui::{Rect, pos2, vec2};
    use parking_lot::Mutex;

    use super::*;
    use crate::arrows::ArrowQueue;
    use crate::config::VisualizerConfig;
    use crate::mesh::{MeshSnapshot, Simulation};

    /// Simulation double that records every command it receives.
    #[derive(Default)]
    pub(in crate::app) struct RecordingSimulation {
        pub(in crate::app) nodes: Mutex<Vec<Coord>>,
        pub(in crate::app) relocations: Mutex<Vec<(usize, Coord)>>,
        pub(in crate::app) modes: Mutex<Vec<usize>>,
    }

    impl RecordingSimulation {
        pub(in crate::app) fn with_nodes(nodes: Vec<Coord>) -> Self {
            Self {
                nodes: Mutex::new(nodes),
                ..Self::default()
            }
        }
    }

    impl Simulation for RecordingSimulation {
        fn node_count(&self) -> usize {
            self.nodes.lock().len()
        }

        fn node_position(&self, index: usize) -> Option<Coord> {
            self.nodes.lock().get(index).copied()
        }

        fn target_position(&self) -> Coord {
            Coord::new(600.0, 400.0)
        }

        fn relocate_node(&self, node_id: usize, position: Coord) -> bool {
            self.relocations.lock().push((node_id, position));
            let mut nodes = self.nodes.lock();
            match node_id.checked_sub(1).and_then(|index| nodes.get_mut(index)) {
                Some(node) => {
                    *node = position;
                    true
                }
                None => false,
            }
        }

        fn max_broadcast_range(&self) -> f32 {
            200.0
        }

        fn snapshot(&self) -> MeshSnapshot {
            MeshSnapshot {
                nodes: self.nodes.lock().clone(),
                target: self.target_position(),
            }
        }

        fn set_mode(&self, mode: usize) {
            self.modes.lock().push(mode);
        }
    }

    pub(in crate::app) fn projection() -> Projection {
        Projection::new(Rect::from_min_size(pos2(0.0, 0.0), vec2(1200.0, 800.0)))
    }

    pub(in crate::app) fn three_node_model() -> (ViewModel, Arc<RecordingSimulation>) {
        let simulation = Arc::new(RecordingSimulation::with_nodes(vec![
            Coord::new(100.0, 100.0),
            Coord::new(200.0, 100.0),
            Coord::new(300.0, 100.0),
        ]));
        let model = ViewModel::new(
            simulation.clone(),
            ArrowQueue::new(32),
            &VisualizerConfig::default(),
        );
        (model, simulation)
    }

    /// Window position of a simulation-space point in an 800 pixel tall view.
    fn window(x: f32, sim_y: f32) -> Pos2 {
        pos2(x, 800.0 - sim_y)
    }

    #[test]
    fn click_toggles_node_selection() {
        let (mut model, _simulation) = three_node_model();
        let projection = projection();

        assert_eq!(
            model.dispatch_press(window(100.0, 105.0), &projection),
            Dispatch::Node(NodeToggle::Selected(0))
        );
        assert_eq!(model.selection.selected_node(), Some(0));

        assert_eq!(
            model.dispatch_press(window(100.0, 105.0), &projection),
            Dispatch::Node(NodeToggle::Deselected(0))
        );
        assert_eq!(model.selection.selected_node(), None);
    }

    #[test]
    fn selecting_another_node_replaces_selection() {
        let (mut model, _simulation) = three_node_model();
        let projection = projection();
        model.dispatch_press(window(100.0, 100.0), &projection);
        model.dispatch_press(window(300.0, 95.0), &projection);
        assert_eq!(model.selection.selected_node(), Some(2));
    }

    #[test]
    fn empty_click_without_selection_does_nothing() {
        let (mut model, simulation) = three_node_model();
        assert_eq!(
            model.dispatch_press(pos2(500.0, 500.0), &projection()),
            Dispatch::Nothing
        );
        assert!(simulation.relocations.lock().is_empty());
    }

    #[test]
    fn empty_click_relocates_selected_node_once() {
        let (mut model, simulation) = three_node_model();
        let projection = projection();
        model.dispatch_press(window(100.0, 105.0), &projection);

        let outcome = model.dispatch_press(pos2(500.0, 500.0), &projection);
        assert_eq!(
            outcome,
            Dispatch::Relocate {
                node_id: 1,
                position: Coord::new(500.0, 300.0),
                applied: true,
            }
        );
        assert_eq!(
            *simulation.relocations.lock(),
            vec![(1, Coord::new(500.0, 300.0))]
        );
        assert_eq!(model.selection.selected_node(), Some(0));
    }

    #[test]
    fn relocated_node_can_be_moved_again() {
        let (mut model, simulation) = three_node_model();
        let projection = projection();
        model.dispatch_press(window(200.0, 100.0), &projection);
        model.dispatch_press(pos2(500.0, 500.0), &projection);
        model.dispatch_press(pos2(700.0, 200.0), &projection);

        assert_eq!(simulation.relocations.lock().len(), 2);
        assert_eq!(
            simulation.node_position(1),
            Some(Coord::new(700.0, 600.0))
        );
        // clicking the node at its new position deselects it
        assert_eq!(
            model.dispatch_press(pos2(700.0, 200.0), &projection),
            Dispatch::Node(NodeToggle::Deselected(1))
        );
    }

    #[test]
    fn toolbar_press_selects_mode_only() {
        let (mut model, simulation) = three_node_model();
        let projection = projection();
        model.dispatch_press(window(100.0, 100.0), &projection);

        assert_eq!(
            model.dispatch_press(pos2(850.0, 20.0), &projection),
            Dispatch::ToolbarItem(2)
        );
        assert_eq!(model.selection.selected_toolbar_item(), 2);
        assert_eq!(model.selection.selected_node(), Some(0));
        assert_eq!(*simulation.modes.lock(), vec![2]);
        assert!(simulation.relocations.lock().is_empty());
    }

    #[test]
    fn toolbar_band_bottom_edge_is_inclusive() {
        let (mut model, _simulation) = three_node_model();
        assert_eq!(
            model.dispatch_press(pos2(450.0, 40.0), &projection()),
            Dispatch::ToolbarItem(1)
        );
    }

    #[test]
    fn toolbar_right_edge_keeps_previous_mode() {
        let (mut model, simulation) = three_node_model();
        let projection = projection();
        model.dispatch_press(pos2(450.0, 10.0), &projection);

        assert_eq!(
            model.dispatch_press(pos2(1200.0, 10.0), &projection),
            Dispatch::ToolbarOutOfRange(3)
        );
        assert_eq!(model.selection.selected_toolbar_item(), 1);
        assert_eq!(*simulation.modes.lock(), vec![1]);
    }
}
