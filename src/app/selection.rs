use eframe::egui::{Rect, pos2, vec2};

use crate::mesh::Coord;

use super::render_utils::Projection;

/// Index of the first node whose hit box, `half_extent` pixels either side of
/// its centre on both axes, strictly contains `point`.
pub(in crate::app) fn find_node(nodes: &[Coord], point: Coord, half_extent: f32) -> Option<usize> {
    nodes.iter().position(|node| {
        node.x < point.x + half_extent
            && node.x > point.x - half_extent
            && node.y < point.y + half_extent
            && node.y > point.y - half_extent
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum NodeToggle {
    Selected(usize),
    Deselected(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) struct SelectionState {
    selected_node: Option<usize>,
    selected_toolbar_item: usize,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            selected_node: None,
            selected_toolbar_item: 0,
        }
    }
}

impl SelectionState {
    pub(in crate::app) fn selected_node(&self) -> Option<usize> {
        self.selected_node
    }

    pub(in crate::app) fn selected_toolbar_item(&self) -> usize {
        self.selected_toolbar_item
    }

    /// Clicking the selected node clears the selection; any other node
    /// replaces it.
    pub(in crate::app) fn toggle_node(&mut self, index: usize) -> NodeToggle {
        if self.selected_node == Some(index) {
            self.selected_node = None;
            NodeToggle::Deselected(index)
        } else {
            self.selected_node = Some(index);
            NodeToggle::Selected(index)
        }
    }

    /// Rejects indices outside `[0, item_count)` and keeps the previous mode.
    pub(in crate::app) fn select_toolbar_item(&mut self, index: usize, item_count: usize) -> bool {
        if index >= item_count {
            return false;
        }
        self.selected_toolbar_item = index;
        true
    }
}

/// Band of equally wide mode buttons along the top edge of the viewport.
#[derive(Clone, Debug)]
pub(in crate::app) struct Toolbar {
    items: Vec<String>,
    height: f32,
}

impl Toolbar {
    pub(in crate::app) fn new(items: Vec<String>, height: f32) -> Self {
        Self { items, height }
    }

    pub(in crate::app) fn items(&self) -> &[String] {
        &self.items
    }

    pub(in crate::app) fn len(&self) -> usize {
        self.items.len()
    }

    /// Tested against raw window Y, measured from the top.
    pub(in crate::app) fn contains_y(&self, window_y: f32) -> bool {
        window_y <= self.height
    }

    pub(in crate::app) fn item_width(&self, viewport_width: f32) -> f32 {
        viewport_width / self.items.len().max(1) as f32
    }

    /// Unclamped: a click on the far right edge can produce `len()`.
    pub(in crate::app) fn find_item(&self, window_x: f32, viewport_width: f32) -> usize {
        (window_x / self.item_width(viewport_width)).floor() as usize
    }

    pub(in crate::app) fn item_rect(&self, index: usize, projection: &Projection) -> Rect {
        let width = self.item_width(projection.width());
        let origin = projection.rect().left_top();
        Rect::from_min_size(
            pos2(origin.x + index as f32 * width, origin.y),
            vec2(width, self.height),
        )
    }
}
