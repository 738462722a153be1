//! Coalesced time switching.
//!
//! Every switch request either resets the destination of a not-yet-started
//! switch task or submits a fresh one. Under a burst of N requests arriving
//! before the executor starts the first task, exactly one switch task and
//! at most one regeneration task run, and the realized time is the last
//! requested one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::{debug, trace};

use crate::events::AnimationEvent;
use crate::executor::{SceneTask, UndoAdapter};
use crate::interface::TimelineShared;
use crate::regenerate::RegenerateFrameTask;
use crate::time_range::TimeRange;

#[derive(Debug)]
struct TokenState {
    destination: i32,
    needs_regeneration: bool,
    started: bool,
}

/// Handle of one in-flight coalesced switch request.
///
/// The switch task owns its token (`Arc`); the coordinator keeps a `Weak`
/// observer so a completed task releases the token on its own. Reset and
/// start share one mutex, making compare-and-reset atomic with respect to
/// the executor starting the task.
#[derive(Debug)]
pub struct SwitchToken {
    state: Mutex<TokenState>,
}

impl SwitchToken {
    fn new(destination: i32, needs_regeneration: bool) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(TokenState {
                destination,
                needs_regeneration,
                started: false,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, TokenState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrite the destination of a task that has not started yet.
    /// Returns false once the task is running; the caller must then submit
    /// a new token/task pair.
    pub fn try_reset(&self, destination: i32, needs_regeneration: bool) -> bool {
        let mut state = self.lock();
        if state.started {
            return false;
        }
        state.destination = destination;
        state.needs_regeneration = needs_regeneration;
        true
    }

    /// Latch the started flag and return the final destination/flag pair.
    /// After this, `try_reset` always fails.
    fn begin(&self) -> (i32, bool) {
        let mut state = self.lock();
        state.started = true;
        (state.destination, state.needs_regeneration)
    }
}

/// Task that realizes a pending time switch.
pub(crate) struct SwitchTimeTask {
    shared: Arc<TimelineShared>,
    token: Arc<SwitchToken>,
    undo: Option<Arc<dyn UndoAdapter>>,
    previous_time: i32,
    /// Whether a companion whole-scene regeneration task was queued right
    /// behind this one at submission.
    regeneration_queued: bool,
}

impl SceneTask for SwitchTimeTask {
    fn name(&self) -> &'static str {
        "switch-time"
    }

    fn run(self: Box<Self>) {
        let (destination, needs_regeneration) = self.token.begin();

        self.shared.state.set_current_time(destination);
        if let Some(undo) = &self.undo {
            undo.commit_time_switch(self.previous_time, destination);
        }
        self.shared
            .events
            .emit(&AnimationEvent::UiTimeChanged { time: destination });

        // A later coalesced request may have flipped the flag on after this
        // task was queued without a companion; cover it here so a burst
        // still runs at most one regeneration.
        if needs_regeneration && !self.regeneration_queued {
            trace!("switch task queueing deferred regeneration for time {destination}");
            self.shared
                .executor
                .submit(Box::new(RegenerateFrameTask::whole_scene(Arc::clone(
                    &self.shared,
                ))));
        }
    }
}

/// Deduplicates and dispatches time-switch requests.
#[derive(Debug, Default)]
pub struct SwitchCoordinator {
    token: Mutex<Weak<SwitchToken>>,
}

impl SwitchCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn request_switch(&self, shared: &Arc<TimelineShared>, time: i32, use_undo: bool) {
        let time = time.max(0);
        if shared.state.current_ui_time() == time {
            return;
        }

        let scene = shared.scene.as_ref();
        let valid_range = TimeRange::calculate_recursive(
            scene,
            scene.root(),
            shared.state.current_ui_time(),
            true,
        );
        let needs_regeneration = !valid_range.contains(time);

        // The slot stays locked across submission so concurrent requests
        // cannot race a second task onto the sequence.
        let mut slot = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        let coalesced = slot
            .upgrade()
            .is_some_and(|token| token.try_reset(time, needs_regeneration));

        if coalesced {
            debug!("coalesced time switch -> {time} (regeneration: {needs_regeneration})");
        } else {
            debug!("submitting time switch -> {time} (regeneration: {needs_regeneration})");
            let token = SwitchToken::new(time, needs_regeneration);
            *slot = Arc::downgrade(&token);

            let task = SwitchTimeTask {
                shared: Arc::clone(shared),
                token,
                undo: if use_undo { shared.undo.clone() } else { None },
                previous_time: shared.state.current_ui_time(),
                regeneration_queued: needs_regeneration,
            };
            shared.executor.submit(Box::new(task));

            if needs_regeneration {
                shared
                    .executor
                    .submit(Box::new(RegenerateFrameTask::whole_scene(Arc::clone(
                        shared,
                    ))));
            }
        }

        // Optimistic advance: the UI time reflects the intended time
        // immediately, while engine time follows when the task runs. Stored
        // while the slot is still locked so concurrent requests land their
        // stores in coalescing order and the last reset owns the final UI
        // time.
        shared.state.set_current_ui_time(time);
        drop(slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_succeeds_until_begin() {
        let token = SwitchToken::new(10, false);
        assert!(token.try_reset(50, true));
        assert_eq!(token.begin(), (50, true));
        assert!(!token.try_reset(70, false));
        // begin after reset failure still reports the latched values
        assert_eq!(token.begin(), (50, true));
    }
}
