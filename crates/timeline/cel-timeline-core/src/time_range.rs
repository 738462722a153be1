//! Frame-time interval algebra.
//!
//! `TimeRange` describes both validity windows ("content does not change
//! anywhere in this span") and dirty spans ("frames in this span must be
//! recomputed"). The recursive constructor folds per-node keyframe
//! information over a scene subtree; traversal is iterative so arbitrarily
//! deep scenes cannot exhaust the call stack.

use serde::{Deserialize, Serialize};

use crate::scene::{NodeId, SceneGraph};

/// A span of frame times, inclusive on both ends. `end == None` means the
/// range extends to infinity. The invalid range contains nothing and is the
/// identity for `union`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    start: i32,
    end: Option<i32>,
    valid: bool,
}

impl TimeRange {
    /// The empty range.
    pub fn invalid() -> Self {
        Self {
            start: 0,
            end: Some(0),
            valid: false,
        }
    }

    /// Finite range `[start, end]`. An inverted pair yields the invalid
    /// range rather than an error.
    pub fn from_time(start: i32, end: i32) -> Self {
        if end < start {
            return Self::invalid();
        }
        Self {
            start,
            end: Some(end),
            valid: true,
        }
    }

    /// Range `[start, +inf)`, the default invalidation span.
    pub fn infinite(start: i32) -> Self {
        Self {
            start,
            end: None,
            valid: true,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[inline]
    pub fn is_infinite(&self) -> bool {
        self.valid && self.end.is_none()
    }

    #[inline]
    pub fn start(&self) -> i32 {
        self.start
    }

    /// Inclusive upper bound; `None` for an infinite range.
    #[inline]
    pub fn end(&self) -> Option<i32> {
        if self.valid {
            self.end
        } else {
            Some(self.start)
        }
    }

    pub fn contains(&self, time: i32) -> bool {
        self.valid && time >= self.start && self.end.map_or(true, |end| time <= end)
    }

    /// Bounding hull of two ranges; the invalid range is the identity.
    pub fn union(self, other: TimeRange) -> TimeRange {
        if !self.valid {
            return other;
        }
        if !other.valid {
            return self;
        }
        TimeRange {
            start: self.start.min(other.start),
            end: match (self.end, other.end) {
                (Some(a), Some(b)) => Some(a.max(b)),
                _ => None,
            },
            valid: true,
        }
    }

    /// Overlap of two ranges; invalid when they do not intersect.
    pub fn intersect(self, other: TimeRange) -> TimeRange {
        if !self.valid || !other.valid {
            return TimeRange::invalid();
        }
        let start = self.start.max(other.start);
        let end = match (self.end, other.end) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        };
        match end {
            Some(end) => TimeRange::from_time(start, end),
            None => TimeRange::infinite(start),
        }
    }

    /// Fold per-node keyframe information over the subtree rooted at `node`.
    ///
    /// With `extend_to_leaves` the result is the maximal span around
    /// `reference_time` during which no node in the subtree changes its
    /// rendered content: the intersection, over every node, of its channels'
    /// identical ranges. A node without keyframe channels never changes with
    /// time and contributes an infinite range.
    ///
    /// Without `extend_to_leaves` the result is the damage span of a change
    /// at `reference_time`: the union, over every node, of its channels'
    /// affected ranges. A node without channels contributes nothing.
    pub fn calculate_recursive(
        scene: &dyn SceneGraph,
        node: NodeId,
        reference_time: i32,
        extend_to_leaves: bool,
    ) -> TimeRange {
        let mut range = if extend_to_leaves {
            TimeRange::infinite(0)
        } else {
            TimeRange::invalid()
        };

        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if extend_to_leaves {
                range = range.intersect(node_identity_range(scene, current, reference_time));
            } else {
                range = range.union(node_damage_range(scene, current, reference_time));
            }
            stack.extend(scene.children(current));
        }

        range
    }
}

fn node_identity_range(scene: &dyn SceneGraph, node: NodeId, time: i32) -> TimeRange {
    let mut range = TimeRange::infinite(0);
    for channel in scene.channels(node) {
        range = range.intersect(channel.identical_range(time));
    }
    range
}

fn node_damage_range(scene: &dyn SceneGraph, node: NodeId, time: i32) -> TimeRange {
    let mut range = TimeRange::invalid();
    for channel in scene.channels(node) {
        range = range.union(channel.affected_range(time));
    }
    range
}
