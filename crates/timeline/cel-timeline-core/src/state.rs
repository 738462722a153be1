//! Per-scene animation state.
//!
//! One `AnimationState` exists per animated scene, owned by its `Timeline`.
//! The two time fields and the last-keyframe cache are atomics because the
//! coordinator updates them synchronously on the calling thread while tasks
//! may complete elsewhere; playback properties sit behind a lock and change
//! only through setters.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::trace;

use crate::aggregate;
use crate::config::TimelineConfig;
use crate::scene::SceneGraph;
use crate::time_range::TimeRange;

/// Sentinel stored in the last-keyframe cache when it must be recomputed.
pub const LAST_KEYFRAME_UNKNOWN: i32 = -1;

#[derive(Debug)]
struct PlaybackProps {
    full_clip_range: TimeRange,
    playback_range: TimeRange,
    framerate: u32,
}

#[derive(Debug)]
pub struct AnimationState {
    /// Engine time: the time actually used when regenerating content.
    current_time: AtomicI32,
    /// UI time: the time last acknowledged to external callers, advanced
    /// optimistically ahead of regeneration. May briefly differ from
    /// `current_time` while a switch is in flight or an external frame is
    /// active.
    current_ui_time: AtomicI32,
    cached_last_keyframe: AtomicI32,
    props: RwLock<PlaybackProps>,
}

impl AnimationState {
    pub fn new(cfg: &TimelineConfig) -> Self {
        Self {
            current_time: AtomicI32::new(0),
            current_ui_time: AtomicI32::new(0),
            cached_last_keyframe: AtomicI32::new(LAST_KEYFRAME_UNKNOWN),
            props: RwLock::new(PlaybackProps {
                full_clip_range: cfg.full_clip_range,
                playback_range: TimeRange::invalid(),
                framerate: cfg.framerate.max(1),
            }),
        }
    }

    fn read_props(&self) -> RwLockReadGuard<'_, PlaybackProps> {
        self.props.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_props(&self) -> RwLockWriteGuard<'_, PlaybackProps> {
        self.props.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub fn current_time(&self) -> i32 {
        self.current_time.load(Ordering::SeqCst)
    }

    #[inline]
    pub fn set_current_time(&self, time: i32) {
        self.current_time.store(time, Ordering::SeqCst);
    }

    #[inline]
    pub fn current_ui_time(&self) -> i32 {
        self.current_ui_time.load(Ordering::SeqCst)
    }

    #[inline]
    pub fn set_current_ui_time(&self, time: i32) {
        self.current_ui_time.store(time, Ordering::SeqCst);
    }

    pub fn full_clip_range(&self) -> TimeRange {
        self.read_props().full_clip_range
    }

    /// Accepts only valid finite ranges; returns whether the value was
    /// taken. An infinite clip would have no end to feed the length
    /// computation.
    pub fn set_full_clip_range(&self, range: TimeRange) -> bool {
        if !range.is_valid() || range.is_infinite() {
            return false;
        }
        self.write_props().full_clip_range = range;
        true
    }

    /// Playback range override, falling back to the full clip range while
    /// unset.
    pub fn playback_range(&self) -> TimeRange {
        let props = self.read_props();
        if props.playback_range.is_valid() {
            props.playback_range
        } else {
            props.full_clip_range
        }
    }

    /// Setting an invalid range clears the override.
    pub fn set_playback_range(&self, range: TimeRange) {
        self.write_props().playback_range = range;
    }

    pub fn framerate(&self) -> u32 {
        self.read_props().framerate
    }

    /// Accepts only positive rates; returns whether the value was taken.
    pub fn set_framerate(&self, fps: u32) -> bool {
        if fps == 0 {
            return false;
        }
        self.write_props().framerate = fps;
        true
    }

    /// Marks the memoized last-keyframe time unknown. Called on every
    /// frame-affecting mutation; the next `total_length` recomputes it.
    pub fn reset_last_keyframe_cache(&self) {
        self.cached_last_keyframe
            .store(LAST_KEYFRAME_UNKNOWN, Ordering::SeqCst);
    }

    /// Effective animation length in frames:
    /// `max(last keyframe, clip end, UI time) + 1`.
    ///
    /// The last-keyframe time is recomputed from the scene only when the
    /// cache holds the unknown sentinel. The cache is advisory; a stale
    /// concurrent store is self-healing on the next invalidation.
    pub fn total_length(&self, scene: &dyn SceneGraph) -> i32 {
        let mut last_key = self.cached_last_keyframe.load(Ordering::SeqCst);
        if last_key == LAST_KEYFRAME_UNKNOWN {
            last_key = aggregate::find_last_keyframe_time(scene);
            self.cached_last_keyframe.store(last_key, Ordering::SeqCst);
            trace!("recomputed last keyframe time: {last_key}");
        }

        let clip_end = self.full_clip_range().end().unwrap_or(0);
        last_key.max(clip_end).max(self.current_ui_time()) + 1
    }
}
