//! Test fixtures for cel-timeline-core.
//!
//! In-memory stand-ins for the collaborators the core consumes through
//! traits: an arena-backed scene graph with stub keyframe channels (plus a
//! JSON loader for declarative scenes), deterministic executors, and
//! recording sinks for events, refreshes and undo commits.

mod executors;
mod recorders;
mod scene;

pub use executors::{ImmediateExecutor, ManualExecutor};
pub use recorders::{EventRecorder, NullUpdater, RecordingUndo, RecordingUpdater};
pub use scene::{scene_from_json, SceneArena, StubChannel};
