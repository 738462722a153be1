//! Timeline: the public façade.
//!
//! Composes the animation state, switch coordinator, invalidation tracker
//! and event bus over the collaborator traits. One `Timeline` exists per
//! animated scene and is cheap to clone (shared handle).

use std::sync::Arc;

use crate::aggregate;
use crate::config::TimelineConfig;
use crate::events::{AnimationEvent, EventBus};
use crate::executor::{TaskExecutor, UndoAdapter};
use crate::invalidation::{self, ExternalFrameScope, InvalidationTracker};
use crate::rect::Rect;
use crate::regenerate::RegenerateFrameTask;
use crate::scene::{NodeId, ProjectionUpdater, SceneGraph};
use crate::state::AnimationState;
use crate::switching::SwitchCoordinator;
use crate::time_range::TimeRange;

/// Everything the components and in-flight tasks share for one scene.
pub(crate) struct TimelineShared {
    pub(crate) scene: Arc<dyn SceneGraph>,
    pub(crate) executor: Arc<dyn TaskExecutor>,
    pub(crate) updater: Arc<dyn ProjectionUpdater>,
    pub(crate) undo: Option<Arc<dyn UndoAdapter>>,
    pub(crate) state: AnimationState,
    pub(crate) events: EventBus,
    pub(crate) tracker: InvalidationTracker,
    pub(crate) coordinator: SwitchCoordinator,
}

/// Animation timeline coordination interface for one scene.
#[derive(Clone)]
pub struct Timeline {
    shared: Arc<TimelineShared>,
}

impl Timeline {
    pub fn new(
        cfg: TimelineConfig,
        scene: Arc<dyn SceneGraph>,
        executor: Arc<dyn TaskExecutor>,
        updater: Arc<dyn ProjectionUpdater>,
        undo: Option<Arc<dyn UndoAdapter>>,
    ) -> Self {
        Self {
            shared: Arc::new(TimelineShared {
                scene,
                executor,
                updater,
                undo,
                state: AnimationState::new(&cfg),
                events: EventBus::new(),
                tracker: InvalidationTracker::new(),
                coordinator: SwitchCoordinator::new(),
            }),
        }
    }

    /// Register an observer; events are delivered synchronously and in
    /// order on the emitting thread.
    pub fn subscribe(&self, observer: impl Fn(&AnimationEvent) + Send + Sync + 'static) {
        self.shared.events.subscribe(observer);
    }

    // ---- time switching ----

    /// Request a switch of the current time. No-op when `time` is already
    /// the UI time; otherwise the request coalesces with a pending
    /// not-yet-started switch or submits a new task pair.
    pub fn request_time_switch(&self, time: i32, use_undo: bool) {
        self.shared
            .coordinator
            .request_switch(&self.shared, time, use_undo);
    }

    pub fn request_time_switch_with_undo(&self, time: i32) {
        self.request_time_switch(time, true);
    }

    /// Direct synchronous override of engine time. No task, no event;
    /// reserved for trusted internal callers that bypass coalescing.
    pub fn explicitly_set_current_time(&self, frame: i32) {
        self.shared.state.set_current_time(frame);
    }

    /// Engine time: the time in effect for regeneration work. May lag
    /// `current_ui_time` while a switch task is in flight; this transient
    /// window is by contract observable.
    pub fn current_time(&self) -> i32 {
        self.shared.state.current_time()
    }

    /// UI time: the destination last acknowledged to callers, advanced
    /// optimistically at request acceptance.
    pub fn current_ui_time(&self) -> i32 {
        self.shared.state.current_ui_time()
    }

    // ---- frame regeneration ----

    /// Regenerate one frame over one region. Never coalesced: every call
    /// submits its own task, which terminates in `FrameReady` or
    /// `FrameCancelled`.
    pub fn request_frame_regeneration(&self, frame: i32, region: Rect) {
        self.shared
            .executor
            .submit(Box::new(RegenerateFrameTask::external_frame(
                Arc::clone(&self.shared),
                frame,
                region,
            )));
    }

    // ---- invalidation ----

    /// Report a node mutation. Converted into a time-range-scoped
    /// `FramesChanged` event unless a suppression mode applies.
    pub fn notify_node_changed(&self, node: NodeId, rect: Rect, recursive: bool) {
        invalidation::notify_node_changed(&self.shared, node, rect, recursive);
    }

    /// Re-entrancy guard for callers regenerating frames that must not
    /// invalidate their own output.
    pub fn block_frame_invalidation(&self, blocked: bool) {
        self.shared.tracker.set_blocked(blocked);
    }

    pub fn external_frame_active(&self) -> bool {
        self.shared.tracker.external_frame_active()
    }

    /// Save engine time and switch to `frame` with the external-frame flag
    /// raised. Pair with `restore_current_time`, or prefer
    /// [`Timeline::external_frame_scope`].
    pub fn save_and_reset_current_time(&self, frame: i32) -> i32 {
        invalidation::save_and_reset_current_time(&self.shared, frame)
    }

    pub fn restore_current_time(&self, saved: i32) {
        invalidation::restore_current_time(&self.shared, saved);
    }

    /// RAII variant of save/restore for rendering "as of" a specific time.
    pub fn external_frame_scope(&self, frame: i32) -> ExternalFrameScope {
        ExternalFrameScope::begin(Arc::clone(&self.shared), frame)
    }

    // ---- clip properties ----

    pub fn full_clip_range(&self) -> TimeRange {
        self.shared.state.full_clip_range()
    }

    pub fn set_full_clip_range(&self, range: TimeRange) {
        if self.shared.state.set_full_clip_range(range) {
            self.shared.events.emit(&AnimationEvent::FullClipRangeChanged);
        }
    }

    pub fn playback_range(&self) -> TimeRange {
        self.shared.state.playback_range()
    }

    pub fn set_playback_range(&self, range: TimeRange) {
        self.shared.state.set_playback_range(range);
        self.shared.events.emit(&AnimationEvent::PlaybackRangeChanged);
    }

    pub fn framerate(&self) -> u32 {
        self.shared.state.framerate()
    }

    pub fn set_framerate(&self, fps: u32) {
        if self.shared.state.set_framerate(fps) {
            self.shared.events.emit(&AnimationEvent::FramerateChanged);
        }
    }

    // ---- aggregation ----

    /// Effective animation length in frames; see
    /// [`AnimationState::total_length`] for the memoization contract.
    pub fn total_length(&self) -> i32 {
        self.shared.state.total_length(self.shared.scene.as_ref())
    }

    pub fn has_animation(&self) -> bool {
        aggregate::has_animation(self.shared.scene.as_ref())
    }
}
