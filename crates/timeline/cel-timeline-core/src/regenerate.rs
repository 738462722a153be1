//! Frame regeneration tasks.
//!
//! Two scopes. Whole-scene regeneration follows a time switch and refreshes
//! the full bounds at the engine's current time, with invalidation blocked
//! so the refresh cannot invalidate the frames it produces. External-frame
//! regeneration renders one specific frame over one region inside an
//! external-frame scope and reports `FrameReady`/`FrameCancelled`.

use std::sync::Arc;

use log::debug;

use crate::events::AnimationEvent;
use crate::executor::SceneTask;
use crate::interface::TimelineShared;
use crate::invalidation::ExternalFrameScope;
use crate::rect::Rect;

enum RegenScope {
    WholeScene,
    ExternalFrame { frame: i32, region: Rect },
}

pub(crate) struct RegenerateFrameTask {
    shared: Arc<TimelineShared>,
    scope: RegenScope,
}

impl RegenerateFrameTask {
    pub(crate) fn whole_scene(shared: Arc<TimelineShared>) -> Self {
        Self {
            shared,
            scope: RegenScope::WholeScene,
        }
    }

    pub(crate) fn external_frame(shared: Arc<TimelineShared>, frame: i32, region: Rect) -> Self {
        // An empty region would regenerate nothing; widen to full bounds.
        let region = if region.is_empty() {
            shared.scene.bounds()
        } else {
            region
        };
        Self {
            shared,
            scope: RegenScope::ExternalFrame { frame, region },
        }
    }
}

impl SceneTask for RegenerateFrameTask {
    fn name(&self) -> &'static str {
        "regenerate-frame"
    }

    fn run(self: Box<Self>) {
        let shared = &self.shared;
        match self.scope {
            RegenScope::WholeScene => {
                debug!(
                    "regenerating whole scene at time {}",
                    shared.state.current_time()
                );
                shared.tracker.set_blocked(true);
                shared
                    .updater
                    .refresh(shared.scene.root(), shared.scene.bounds());
                shared.tracker.set_blocked(false);
            }
            RegenScope::ExternalFrame { frame, region } => {
                debug!("regenerating external frame {frame}");
                {
                    let _scope = ExternalFrameScope::begin(Arc::clone(shared), frame);
                    shared.updater.refresh(shared.scene.root(), region);
                }
                shared.events.emit(&AnimationEvent::FrameReady { time: frame });
            }
        }
    }

    fn cancelled(self: Box<Self>) {
        if let RegenScope::ExternalFrame { frame, .. } = self.scope {
            debug!("external frame {frame} cancelled before start");
            self.shared.events.emit(&AnimationEvent::FrameCancelled);
        }
    }
}
