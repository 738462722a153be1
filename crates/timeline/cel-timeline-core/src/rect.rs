//! Integer pixel regions.
//!
//! Carried opaquely through invalidation events and regeneration tasks; the
//! renderer intersects them against its cached frames. The core never reads
//! pixel data.

use serde::{Deserialize, Serialize};

/// Axis-aligned integer rectangle. A rectangle with non-positive width or
/// height is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Bounding rectangle of `self` and `other`; an empty side is ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Rect::new(x, y, right - x, bottom - y)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_ignores_empty_sides() {
        let a = Rect::new(10, 10, 20, 20);
        assert_eq!(a.union(&Rect::empty()), a);
        assert_eq!(Rect::empty().union(&a), a);
        let b = Rect::new(0, 0, 5, 5);
        assert_eq!(a.union(&b), Rect::new(0, 0, 30, 30));
    }

    #[test]
    fn intersects_excludes_touching_edges() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.intersects(&Rect::new(5, 5, 10, 10)));
        assert!(!a.intersects(&Rect::new(10, 0, 10, 10)));
        assert!(!a.intersects(&Rect::empty()));
    }
}
