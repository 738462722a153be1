//! Collaborator traits for task execution and undo logging.
//!
//! The executor owns one ordered task sequence per scene: tasks run strictly
//! in submission order, on whatever thread the executor chooses. Submission
//! never blocks; outcomes surface only through timeline events. A queued
//! task that will never run must be handed to `SceneTask::cancelled`, never
//! silently dropped.

use serde::{Deserialize, Serialize};

/// Handle of one submitted task, unique per executor.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TaskHandle(pub u64);

/// One unit of scene-mutating work.
pub trait SceneTask: Send {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Execute the task. Consumes the task; runs at most once.
    fn run(self: Box<Self>);

    /// Called instead of `run` when the executor discards the task before
    /// it started.
    fn cancelled(self: Box<Self>) {}
}

pub trait TaskExecutor: Send + Sync {
    fn submit(&self, task: Box<dyn SceneTask>) -> TaskHandle;

    /// Block until `handle` has run, for callers that bracket a sequence
    /// (e.g. scripted frame export). The coordinator itself never waits;
    /// its ordering guarantee is submission order alone.
    fn wait(&self, handle: TaskHandle) {
        let _ = handle;
    }
}

/// Post-execution undo log. The adapter records an already-performed time
/// switch; it does not re-execute anything.
pub trait UndoAdapter: Send + Sync {
    fn commit_time_switch(&self, from: i32, to: i32);
}
