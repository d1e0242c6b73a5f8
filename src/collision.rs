/// Axis-aligned rectangles and pairwise overlap tests.
///
/// Entity counts stay in the tens, so every check is a plain pairwise scan;
/// there is no broad phase.

use serde::{Deserialize, Serialize};

use crate::entities::Entity;

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    pub fn has_area(&self) -> bool {
        self.w > 0.0 && self.h > 0.0
    }
}

/// Standard AABB intersection: the rectangles overlap iff their intervals
/// intersect on both axes.  Touching edges do not count.
pub fn collides(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && b.x < a.right() && a.y < b.bottom() && b.y < a.bottom()
}

/// Index of the first active candidate overlapping `probe`, in iteration
/// order.
///
/// A bullet that overlaps several enemies in one tick resolves against this
/// one only; the rest never see it.
pub fn first_hit<E: Entity>(probe: &Rect, candidates: &[E]) -> Option<usize> {
    candidates
        .iter()
        .position(|candidate| candidate.is_active() && collides(probe, &candidate.rect()))
}
