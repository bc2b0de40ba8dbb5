use eframe::egui::{Color32, Pos2, Rect, pos2};

use crate::arrows::Direction;
use crate::mesh::Coord;

pub(super) const BACKGROUND: Color32 = Color32::BLACK;
pub(super) const NODE_COLOR: Color32 = Color32::from_rgb(0, 255, 0);
pub(super) const SELECTED_NODE_COLOR: Color32 = Color32::from_rgb(255, 0, 255);
pub(super) const TARGET_COLOR: Color32 = Color32::from_rgb(255, 0, 0);
pub(super) const RING_COLOR: Color32 = Color32::from_rgb(128, 128, 128);
pub(super) const TOOLBAR_COLOR: Color32 = Color32::from_rgb(128, 128, 128);
pub(super) const TOOLBAR_SELECTED_COLOR: Color32 = Color32::from_rgb(255, 0, 255);
pub(super) const TOOLBAR_TEXT_COLOR: Color32 = Color32::WHITE;
pub(super) const SEND_COLOR: Color32 = Color32::from_rgb(0, 255, 255);
pub(super) const RECEIVE_COLOR: Color32 = Color32::from_rgb(255, 255, 0);

pub(super) const ARROW_OFFSET: f32 = 5.0;
pub(super) const ARROWHEAD_LENGTH: f32 = 10.0;
pub(super) const ARROWHEAD_ANGLE: f32 = 1.0;

pub(super) fn arrow_color(direction: Direction) -> Color32 {
    match direction {
        Direction::Send => SEND_COLOR,
        Direction::Receive => RECEIVE_COLOR,
    }
}

/// Maps between window points (origin top-left, Y down) and simulation space
/// (origin bottom-left, Y up). Rebuilt from the drawing rect every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Projection {
    rect: Rect,
}

impl Projection {
    pub(super) fn new(rect: Rect) -> Self {
        Self { rect }
    }

    pub(super) fn rect(&self) -> Rect {
        self.rect
    }

    pub(super) fn width(&self) -> f32 {
        self.rect.width()
    }

    pub(super) fn height(&self) -> f32 {
        self.rect.height()
    }

    /// Window position relative to the top-left corner of the viewport,
    /// without flipping.
    pub(super) fn window_local(&self, window: Pos2) -> Pos2 {
        pos2(window.x - self.rect.left(), window.y - self.rect.top())
    }

    pub(super) fn window_to_sim(&self, window: Pos2) -> Coord {
        let local = self.window_local(window);
        Coord::new(local.x, self.height() - local.y)
    }

    pub(super) fn sim_to_window(&self, coord: Coord) -> Pos2 {
        pos2(
            self.rect.left() + coord.x,
            self.rect.top() + self.height() - coord.y,
        )
    }
}

/// Line plus triangular head for one arrow event, in simulation space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct ArrowShape {
    pub(super) start: Coord,
    pub(super) end: Coord,
    pub(super) head: [Coord; 3],
}

/// Unit normal of `(dx, dy)` pointing into the left half-plane, so that both
/// directions of a link share one normal.
fn canonical_normal(dx: f32, dy: f32) -> (f32, f32) {
    let (nx, ny) = (-dy, dx);
    if nx > 0.0 || (nx == 0.0 && ny > 0.0) {
        (-nx, -ny)
    } else {
        (nx, ny)
    }
}

/// `None` when both endpoints coincide.
pub(super) fn arrow_geometry(from: Coord, to: Coord, direction: Direction) -> Option<ArrowShape> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length <= f32::EPSILON {
        return None;
    }
    let (dx, dy) = (dx / length, dy / length);

    let (nx, ny) = canonical_normal(dx, dy);
    let side = match direction {
        Direction::Send => ARROW_OFFSET,
        Direction::Receive => -ARROW_OFFSET,
    };
    let start = Coord::new(from.x + nx * side, from.y + ny * side);
    let end = Coord::new(to.x + nx * side, to.y + ny * side);

    let (sin, cos) = ARROWHEAD_ANGLE.sin_cos();
    let head = [
        end,
        Coord::new(
            end.x - ARROWHEAD_LENGTH * (dx * cos + dy * sin),
            end.y - ARROWHEAD_LENGTH * (dy * cos - dx * sin),
        ),
        Coord::new(
            end.x - ARROWHEAD_LENGTH * (dx * cos - dy * sin),
            end.y - ARROWHEAD_LENGTH * (dy * cos + dx * sin),
        ),
    ];

    Some(ArrowShape { start, end, head })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Projection {
        Projection::new(Rect::from_min_size(pos2(0.0, 0.0), eframe::egui::vec2(1200.0, 800.0)))
    }

    #[test]
    fn window_and_sim_flip_y() {
        let projection = viewport();
        assert_eq!(
            projection.window_to_sim(pos2(500.0, 500.0)),
            Coord::new(500.0, 300.0)
        );
        assert_eq!(
            projection.sim_to_window(Coord::new(100.0, 100.0)),
            pos2(100.0, 700.0)
        );
    }

    #[test]
    fn projection_round_trip_with_offset_rect() {
        let projection = Projection::new(Rect::from_min_size(
            pos2(8.0, 16.0),
            eframe::egui::vec2(640.0, 480.0),
        ));
        let coord = Coord::new(123.0, 45.0);
        let back = projection.window_to_sim(projection.sim_to_window(coord));
        assert!((back.x - coord.x).abs() < 1e-4);
        assert!((back.y - coord.y).abs() < 1e-4);
        assert_eq!(projection.window_local(pos2(8.0, 16.0)), pos2(0.0, 0.0));
    }

    #[test]
    fn send_and_receive_sit_on_opposite_sides() {
        let a = Coord::new(100.0, 100.0);
        let b = Coord::new(200.0, 100.0);
        let send = arrow_geometry(a, b, Direction::Send).expect("non-degenerate");
        let receive = arrow_geometry(b, a, Direction::Receive).expect("non-degenerate");

        // horizontal link: offsets are vertical and opposite
        assert!((send.start.y - 95.0).abs() < 1e-4 || (send.start.y - 105.0).abs() < 1e-4);
        assert!((send.start.y - 100.0) * (receive.start.y - 100.0) < 0.0);
        assert!((send.start.x - 100.0).abs() < 1e-4);
    }

    #[test]
    fn vertical_send_is_offset_left() {
        let shape = arrow_geometry(
            Coord::new(100.0, 100.0),
            Coord::new(100.0, 300.0),
            Direction::Send,
        )
        .expect("non-degenerate");
        assert!((shape.start.x - 95.0).abs() < 1e-4);
        assert!((shape.end.x - 95.0).abs() < 1e-4);
    }

    #[test]
    fn arrowhead_points_back_along_the_line() {
        let shape = arrow_geometry(
            Coord::new(0.0, 0.0),
            Coord::new(100.0, 0.0),
            Direction::Receive,
        )
        .expect("non-degenerate");
        assert_eq!(shape.head[0], shape.end);
        for corner in &shape.head[1..] {
            assert!(corner.x < shape.end.x);
            assert!((shape.end.distance(*corner) - ARROWHEAD_LENGTH).abs() < 1e-3);
        }
        // the two back corners mirror each other across the line
        assert!((shape.head[1].y - shape.end.y + shape.head[2].y - shape.end.y).abs() < 1e-3);
    }

    #[test]
    fn degenerate_arrow_is_skipped() {
        let point = Coord::new(10.0, 10.0);
        assert_eq!(arrow_geometry(point, point, Direction::Send), None);
    }

    #[test]
    fn colors_differ_by_direction() {
        assert_ne!(arrow_color(Direction::Send), arrow_color(Direction::Receive));
    }
}
