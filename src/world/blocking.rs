//! Obstacle blocking and collision-checked movement
//!
//! Movement is resolved one axis at a time: the X step is attempted first,
//! then the Y step from wherever X ended up. A step that would overlap any
//! obstacle is rejected on that axis only, which lets movers slide along
//! walls. The result is clamped to the world bounds.

use crate::core::types::{Rect, Vec2};

/// Set of solid rectangles
#[derive(Debug, Clone, Default)]
pub struct Obstacles {
    rects: Vec<Rect>,
}

impl Obstacles {
    pub fn new() -> Self {
        Self { rects: Vec::new() }
    }

    pub fn from_rects(rects: impl IntoIterator<Item = Rect>) -> Self {
        Self {
            rects: rects.into_iter().collect(),
        }
    }

    pub fn add(&mut self, rect: Rect) {
        self.rects.push(rect);
    }

    /// True if `shape` overlaps any obstacle
    pub fn is_blocked(&self, shape: &Rect) -> bool {
        self.rects.iter().any(|r| r.overlaps(shape))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rect> {
        self.rects.iter()
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

/// Attempt to move `shape` by (`dx`, `dy`) and return its resulting origin
pub fn try_move(shape: &Rect, dx: f32, dy: f32, obstacles: &Obstacles, bounds: &Rect) -> Vec2 {
    let mut moved = *shape;

    let step_x = moved.with_origin(Vec2::new(moved.x + dx, moved.y));
    if dx != 0.0 && !obstacles.is_blocked(&step_x) {
        moved = step_x;
    }

    let step_y = moved.with_origin(Vec2::new(moved.x, moved.y + dy));
    if dy != 0.0 && !obstacles.is_blocked(&step_y) {
        moved = step_y;
    }

    moved.clamp_within(bounds).origin()
}
