//! Axis-aligned rectangle math
//!
//! Ideas and the trash target are plain rectangles in canvas space
//! (origin top-left, y grows downward).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle given by its top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap test; rectangles that only share an edge do not overlap
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Inclusive overlap test used for drop targets, where touching counts
    pub fn touches(&self, other: &Rect) -> bool {
        !(self.right() < other.left()
            || self.left() > other.right()
            || self.bottom() < other.top()
            || self.top() > other.bottom())
    }

    /// Penetration depth on each axis, or `None` if the rectangles don't overlap
    pub fn overlap_depth(&self, other: &Rect) -> Option<Vec2> {
        if !self.overlaps(other) {
            return None;
        }
        let x = (self.right() - other.left()).min(other.right() - self.left());
        let y = (self.bottom() - other.top()).min(other.bottom() - self.top());
        Some(Vec2::new(x, y))
    }
}
