use std::time::Instant;

use eframe::egui::{Align2, FontId, Painter, Pos2, Rect, Shape, Stroke, vec2};

use crate::arrows::{ArrowEvent, Direction};
use crate::mesh::MeshSnapshot;

use super::ViewModel;
use super::render_utils::{
    BACKGROUND, NODE_COLOR, Projection, RING_COLOR, SELECTED_NODE_COLOR, TARGET_COLOR,
    TOOLBAR_COLOR, TOOLBAR_SELECTED_COLOR, TOOLBAR_TEXT_COLOR, arrow_color, arrow_geometry,
};

const NODE_MARKER_HALF_EXTENT: f32 = 10.0;
const TARGET_MARKER_HALF_EXTENT: f32 = 25.0;
const ARROW_LINE_WIDTH: f32 = 3.0;
const LABEL_SCALE: f32 = 1.0;

/// Label font, created once with the app rather than per frame.
#[derive(Clone, Debug)]
pub(in crate::app) struct ToolbarFont {
    base_size: f32,
}

impl ToolbarFont {
    pub(in crate::app) fn new() -> Self {
        Self { base_size: 14.0 }
    }

    fn font_id(&self, scale: f32) -> FontId {
        FontId::proportional(self.base_size * scale)
    }

    pub(in crate::app) fn render_text(&self, painter: &Painter, label: &str, center: Pos2, scale: f32) {
        painter.text(
            center,
            Align2::CENTER_CENTER,
            label,
            self.font_id(scale),
            TOOLBAR_TEXT_COLOR,
        );
    }
}

/// One element of a frame, in window coordinates, in paint order.
#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) enum DrawCommand {
    Clear(Rect),
    Node { center: Pos2, selected: bool },
    Target { center: Pos2 },
    Ring { center: Pos2, radius: f32 },
    ToolbarItem { rect: Rect, selected: bool },
    Label { text: String, center: Pos2, scale: f32 },
    Arrow {
        line: [Pos2; 2],
        head: [Pos2; 3],
        direction: Direction,
    },
}

impl DrawCommand {
    fn paint(&self, painter: &Painter, font: &ToolbarFont) {
        match self {
            Self::Clear(rect) => {
                painter.rect_filled(*rect, 0.0, BACKGROUND);
            }
            Self::Node { center, selected } => {
                let color = if *selected {
                    SELECTED_NODE_COLOR
                } else {
                    NODE_COLOR
                };
                painter.rect_filled(marker_rect(*center, NODE_MARKER_HALF_EXTENT), 0.0, color);
            }
            Self::Target { center } => {
                painter.rect_filled(
                    marker_rect(*center, TARGET_MARKER_HALF_EXTENT),
                    0.0,
                    TARGET_COLOR,
                );
            }
            Self::Ring { center, radius } => {
                painter.circle_stroke(*center, *radius, Stroke::new(1.0, RING_COLOR));
            }
            Self::ToolbarItem { rect, selected } => {
                let color = if *selected {
                    TOOLBAR_SELECTED_COLOR
                } else {
                    TOOLBAR_COLOR
                };
                painter.rect_filled(*rect, 0.0, color);
            }
            Self::Label {
                text,
                center,
                scale,
            } => font.render_text(painter, text, *center, *scale),
            Self::Arrow {
                line,
                head,
                direction,
            } => {
                let color = arrow_color(*direction);
                painter.line_segment(*line, Stroke::new(ARROW_LINE_WIDTH, color));
                painter.add(Shape::convex_polygon(head.to_vec(), color, Stroke::NONE));
            }
        }
    }
}

fn marker_rect(center: Pos2, half_extent: f32) -> Rect {
    Rect::from_center_size(center, vec2(half_extent * 2.0, half_extent * 2.0))
}

impl ViewModel {
    /// Builds the frame from one consistent snapshot of the simulation:
    /// clear, nodes, target, range rings, toolbar, arrows.
    pub(in crate::app) fn render_frame(&mut self, projection: &Projection, now: Instant) -> Vec<DrawCommand> {
        let snapshot = self.simulation.snapshot();
        let arrows = self.arrows.snapshot();

        let mut commands = Vec::with_capacity(
            1 + snapshot.nodes.len() * 2 + 1 + self.toolbar.len() * 2 + arrows.len(),
        );
        commands.push(DrawCommand::Clear(projection.rect()));
        self.draw_nodes(&mut commands, projection, &snapshot);
        commands.push(DrawCommand::Target {
            center: projection.sim_to_window(snapshot.target),
        });
        self.draw_ranges(&mut commands, projection, &snapshot, now);
        self.draw_toolbar(&mut commands, projection);
        draw_arrows(&mut commands, projection, &snapshot, &arrows);
        commands
    }

    pub(in crate::app) fn present(&self, painter: &Painter, commands: &[DrawCommand]) {
        for command in commands {
            command.paint(painter, &self.font);
        }
    }

    fn draw_nodes(&self, commands: &mut Vec<DrawCommand>, projection: &Projection, snapshot: &MeshSnapshot) {
        let selected = self.selection.selected_node();
        commands.extend(snapshot.nodes.iter().enumerate().map(|(index, node)| {
            DrawCommand::Node {
                center: projection.sim_to_window(*node),
                selected: selected == Some(index),
            }
        }));
    }

    fn draw_ranges(
        &mut self,
        commands: &mut Vec<DrawCommand>,
        projection: &Projection,
        snapshot: &MeshSnapshot,
        now: Instant,
    ) {
        let radius = self.clock.radius_at(now);
        commands.extend(snapshot.nodes.iter().map(|node| DrawCommand::Ring {
            center: projection.sim_to_window(*node),
            radius,
        }));
    }

    fn draw_toolbar(&self, commands: &mut Vec<DrawCommand>, projection: &Projection) {
        let selected = self.selection.selected_toolbar_item();
        for (index, label) in self.toolbar.items().iter().enumerate() {
            let rect = self.toolbar.item_rect(index, projection);
            commands.push(DrawCommand::ToolbarItem {
                rect,
                selected: index == selected,
            });
            commands.push(DrawCommand::Label {
                text: label.clone(),
                center: rect.center(),
                scale: LABEL_SCALE,
            });
        }
    }
}

fn draw_arrows(
    commands: &mut Vec<DrawCommand>,
    projection: &Projection,
    snapshot: &MeshSnapshot,
    arrows: &[ArrowEvent],
) {
    for event in arrows {
        let (Some(from), Some(to)) = (
            snapshot.node_by_id(event.from_node),
            snapshot.node_by_id(event.to_node),
        ) else {
            tracing::debug!(?event, "arrow names an unknown node; skipped");
            continue;
        };
        let Some(shape) = arrow_geometry(from, to, event.direction) else {
            continue;
        };
        commands.push(DrawCommand::Arrow {
            line: [
                projection.sim_to_window(shape.start),
                projection.sim_to_window(shape.end),
            ],
            head: shape.head.map(|corner| projection.sim_to_window(corner)),
            direction: event.direction,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::app::input::tests::{projection, three_node_model};
    use crate::app::selection::NodeToggle;
    use crate::mesh::Coord;

    fn kinds(commands: &[DrawCommand]) -> Vec<&'static str> {
        commands
            .iter()
            .map(|command| match command {
                DrawCommand::Clear(_) => "clear",
                DrawCommand::Node { .. } => "node",
                DrawCommand::Target { .. } => "target",
                DrawCommand::Ring { .. } => "ring",
                DrawCommand::ToolbarItem { .. } => "toolbar",
                DrawCommand::Label { .. } => "label",
                DrawCommand::Arrow { .. } => "arrow",
            })
            .collect()
    }

    #[test]
    fn frame_is_drawn_in_pipeline_order() {
        let (mut model, _simulation) = three_node_model();
        model.arrows.push(ArrowEvent::new(1, 2, Direction::Send));
        let commands = model.render_frame(&projection(), Instant::now());
        assert_eq!(
            kinds(&commands),
            vec![
                "clear", "node", "node", "node", "target", "ring", "ring", "ring", "toolbar",
                "label", "toolbar", "label", "toolbar", "label", "arrow",
            ]
        );
    }

    #[test]
    fn nodes_are_placed_with_flipped_y_and_selection_highlighted() {
        let (mut model, _simulation) = three_node_model();
        assert_eq!(model.selection.toggle_node(1), NodeToggle::Selected(1));
        let commands = model.render_frame(&projection(), Instant::now());

        let nodes = commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Node { center, selected } => Some((*center, *selected)),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(
            nodes,
            vec![
                (Pos2::new(100.0, 700.0), false),
                (Pos2::new(200.0, 700.0), true),
                (Pos2::new(300.0, 700.0), false),
            ]
        );
    }

    #[test]
    fn rings_share_the_clock_radius() {
        let (mut model, _simulation) = three_node_model();
        let start = Instant::now();
        model.clock.reset(start);
        let commands = model.render_frame(&projection(), start + Duration::from_secs(1));
        let radii = commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Ring { radius, .. } => Some(*radius),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(radii.len(), 3);
        assert!(radii.iter().all(|radius| (radius - 60.0).abs() < 1e-3));
    }

    #[test]
    fn toolbar_highlights_selected_item() {
        let (mut model, _simulation) = three_node_model();
        assert!(model.selection.select_toolbar_item(1, 3));
        let commands = model.render_frame(&projection(), Instant::now());
        let selected = commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::ToolbarItem { selected, .. } => Some(*selected),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(selected, vec![false, true, false]);

        let labels = commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Label { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["Route", "Broadcast", "Pause"]);
    }

    #[test]
    fn arrows_keep_queue_order_and_direction() {
        let (mut model, _simulation) = three_node_model();
        model.arrows.push(ArrowEvent::new(1, 2, Direction::Send));
        model.arrows.push(ArrowEvent::new(2, 3, Direction::Receive));

        for _ in 0..2 {
            let commands = model.render_frame(&projection(), Instant::now());
            let arrows = commands
                .iter()
                .filter_map(|command| match command {
                    DrawCommand::Arrow { line, direction, .. } => Some((*line, *direction)),
                    _ => None,
                })
                .collect::<Vec<_>>();
            assert_eq!(arrows.len(), 2);
            assert_eq!(arrows[0].1, Direction::Send);
            assert_eq!(arrows[1].1, Direction::Receive);
            // horizontal links: send and receive are pushed to opposite sides
            assert!(arrows[0].0[0].y > 700.0);
            assert!(arrows[1].0[0].y < 700.0);
        }
    }

    #[test]
    fn arrows_with_unknown_or_coincident_nodes_are_skipped() {
        let (mut model, simulation) = three_node_model();
        model.arrows.push(ArrowEvent::new(0, 2, Direction::Send));
        model.arrows.push(ArrowEvent::new(1, 9, Direction::Send));
        simulation.nodes.lock()[1] = Coord::new(100.0, 100.0);
        model.arrows.push(ArrowEvent::new(1, 2, Direction::Receive));

        let commands = model.render_frame(&projection(), Instant::now());
        assert!(
            !commands
                .iter()
                .any(|command| matches!(command, DrawCommand::Arrow { .. }))
        );
    }
}
