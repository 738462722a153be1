//! Timeline events and observer fan-out.
//!
//! Events are delivered synchronously and in order on the thread of the
//! emitting coordination step, to every observer in subscription order.
//! An observer registered during delivery receives later events only.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::rect::Rect;
use crate::time_range::TimeRange;

/// Discrete signals emitted by the timeline.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub enum AnimationEvent {
    /// The UI-facing time landed on `time`. Fires once per executed switch
    /// task with its final coalesced destination; superseded destinations
    /// are absorbed silently.
    UiTimeChanged { time: i32 },
    /// Cached frames intersecting both `range` and `rect` must be dropped.
    FramesChanged { range: TimeRange, rect: Rect },
    /// A requested external frame finished regenerating.
    FrameReady { time: i32 },
    /// A requested external frame was discarded before it ran.
    FrameCancelled,
    FullClipRangeChanged,
    PlaybackRangeChanged,
    FramerateChanged,
    /// Catch-all for forward-compatible payloads.
    Custom {
        kind: String,
        data: serde_json::Value,
    },
}

type Observer = Arc<dyn Fn(&AnimationEvent) + Send + Sync>;

/// Observer list with synchronous in-order delivery.
#[derive(Default)]
pub struct EventBus {
    observers: RwLock<Vec<Observer>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: impl Fn(&AnimationEvent) + Send + Sync + 'static) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(observer));
    }

    /// Snapshot the observer list before delivering, so a callback may
    /// subscribe without deadlocking on the list lock.
    pub fn emit(&self, event: &AnimationEvent) {
        let observers: Vec<Observer> = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for observer in &observers {
            observer(event);
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("EventBus").field("observers", &count).finish()
    }
}
