//! Frame invalidation tracking.
//!
//! Node mutations arrive as notifications and leave as time-range-scoped
//! `FramesChanged` events. Two suppression modes exist: the external-frame
//! flag, raised while the scene renders "as of" a foreign time, and the
//! explicit block, raised by the engine while it regenerates the very
//! frames a notification would invalidate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, trace};

use crate::events::AnimationEvent;
use crate::interface::TimelineShared;
use crate::rect::Rect;
use crate::scene::{NodeId, CONTENT_CHANNEL};
use crate::time_range::TimeRange;

#[derive(Debug, Default)]
pub struct InvalidationTracker {
    external_frame_active: AtomicBool,
    invalidation_blocked: AtomicBool,
}

impl InvalidationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn external_frame_active(&self) -> bool {
        self.external_frame_active.load(Ordering::SeqCst)
    }

    #[inline]
    pub(crate) fn set_external_frame_active(&self, active: bool) {
        self.external_frame_active.store(active, Ordering::SeqCst);
    }

    #[inline]
    pub fn blocked(&self) -> bool {
        self.invalidation_blocked.load(Ordering::SeqCst)
    }

    #[inline]
    pub fn set_blocked(&self, blocked: bool) {
        self.invalidation_blocked.store(blocked, Ordering::SeqCst);
    }
}

/// Convert a node mutation into a scoped invalidation, or swallow it when a
/// suppression mode is active or the node cannot affect frames.
pub(crate) fn notify_node_changed(
    shared: &TimelineShared,
    node: NodeId,
    rect: Rect,
    recursive: bool,
) {
    if shared.tracker.external_frame_active() || shared.tracker.blocked() {
        trace!("invalidation suppressed for node {node:?}");
        return;
    }
    if !shared.scene.affects_animation(node) {
        return;
    }

    let current_time = shared.state.current_time();
    let range = if recursive {
        TimeRange::calculate_recursive(shared.scene.as_ref(), node, current_time, false)
    } else if let Some(channel) = shared.scene.channel(node, CONTENT_CHANNEL) {
        channel.affected_range(current_time)
    } else {
        // Unknown animation behavior: conservative fallback.
        TimeRange::infinite(0)
    };

    invalidate_frames(shared, range, rect);
}

/// Reset the length memoization and tell the renderer which cached frames
/// to drop.
pub(crate) fn invalidate_frames(shared: &TimelineShared, range: TimeRange, rect: Rect) {
    debug!("invalidating frames {range:?}");
    shared.state.reset_last_keyframe_cache();
    shared
        .events
        .emit(&AnimationEvent::FramesChanged { range, rect });
}

pub(crate) fn save_and_reset_current_time(shared: &TimelineShared, frame: i32) -> i32 {
    shared.tracker.set_external_frame_active(true);
    let saved = shared.state.current_time();
    shared.state.set_current_time(frame);
    saved
}

pub(crate) fn restore_current_time(shared: &TimelineShared, saved: i32) {
    shared.state.set_current_time(saved);
    shared.tracker.set_external_frame_active(false);
}

/// Scoped save/restore of engine time with invalidation suppressed for the
/// duration. Dropping the guard restores the saved time and lowers the
/// external-frame flag.
pub struct ExternalFrameScope {
    shared: Arc<TimelineShared>,
    saved: i32,
}

impl ExternalFrameScope {
    pub(crate) fn begin(shared: Arc<TimelineShared>, frame: i32) -> Self {
        let saved = save_and_reset_current_time(&shared, frame);
        Self { shared, saved }
    }
}

impl Drop for ExternalFrameScope {
    fn drop(&mut self) {
        restore_current_time(&self.shared, self.saved);
    }
}
