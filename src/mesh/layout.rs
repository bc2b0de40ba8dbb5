use crate::util::stable_pair;

use super::Coord;

/// Axis-aligned area nodes may be placed in, in simulation space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Coord,
    pub max: Coord,
}

impl Bounds {
    pub fn center(&self) -> Coord {
        Coord::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.x >= self.min.x
            && coord.x <= self.max.x
            && coord.y >= self.min.y
            && coord.y <= self.max.y
    }

    fn clamp(&self, coord: Coord) -> Coord {
        Coord::new(
            coord.x.clamp(self.min.x, self.max.x),
            coord.y.clamp(self.min.y, self.max.y),
        )
    }
}

/// Drawable area below the toolbar, shrunk by `margin` on every side.
pub fn drawable_bounds(width: u32, height: u32, toolbar_height: u32, margin: f32) -> Bounds {
    let top = (height.saturating_sub(toolbar_height)) as f32;
    let margin = margin.min(width as f32 * 0.5).min(top * 0.5);
    Bounds {
        min: Coord::new(margin, margin),
        max: Coord::new(width as f32 - margin, top - margin),
    }
}

/// Deterministic scatter of `count` nodes, relaxed so that no two nodes sit
/// closer than `min_spacing` where the bounds allow it.
pub fn scatter_nodes(count: usize, bounds: Bounds, seed: u64, min_spacing: f32) -> Vec<Coord> {
    let span_x = bounds.max.x - bounds.min.x;
    let span_y = bounds.max.y - bounds.min.y;

    let mut positions = (0..count)
        .map(|index| {
            let (jx, jy) = stable_pair((seed, index as u64));
            Coord::new(bounds.min.x + jx * span_x, bounds.min.y + jy * span_y)
        })
        .collect::<Vec<_>>();

    if count < 2 {
        return positions;
    }

    for _ in 0..64 {
        let mut moved = false;
        for i in 0..count {
            for j in (i + 1)..count {
                let dx = positions[i].x - positions[j].x;
                let dy = positions[i].y - positions[j].y;
                let distance = (dx * dx + dy * dy).sqrt();
                if distance >= min_spacing {
                    continue;
                }

                // coincident points get pushed apart along a hashed direction
                let (ux, uy) = if distance > f32::EPSILON {
                    (dx / distance, dy / distance)
                } else {
                    let (hx, hy) = stable_pair((seed, i as u64, j as u64));
                    let angle = (hx + hy) * std::f32::consts::PI;
                    (angle.cos(), angle.sin())
                };
                let push = (min_spacing - distance) * 0.5;
                positions[i] = bounds.clamp(Coord::new(
                    positions[i].x + ux * push,
                    positions[i].y + uy * push,
                ));
                positions[j] = bounds.clamp(Coord::new(
                    positions[j].x - ux * push,
                    positions[j].y - uy * push,
                ));
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }

    positions
}
