//! cel timeline coordination core (engine-agnostic).
//!
//! Lets a mutable, hierarchical scene be scrubbed through time: time-switch
//! requests are coalesced onto a single in-flight task, scene mutations
//! become time-range-scoped frame invalidations, and the effective clip
//! length is aggregated from per-node keyframe data. Rendering, keyframe
//! storage and task execution stay behind the traits in [`scene`] and
//! [`executor`].

pub mod aggregate;
pub mod config;
pub mod events;
pub mod executor;
pub mod interface;
pub mod invalidation;
pub mod rect;
mod regenerate;
pub mod scene;
pub mod state;
pub mod switching;
pub mod time_range;

// Re-exports for consumers (hosts and fixtures)
pub use config::TimelineConfig;
pub use events::{AnimationEvent, EventBus};
pub use executor::{SceneTask, TaskExecutor, TaskHandle, UndoAdapter};
pub use interface::Timeline;
pub use invalidation::{ExternalFrameScope, InvalidationTracker};
pub use rect::Rect;
pub use scene::{KeyframeChannel, NodeId, ProjectionUpdater, SceneGraph, CONTENT_CHANNEL};
pub use state::{AnimationState, LAST_KEYFRAME_UNKNOWN};
pub use switching::{SwitchCoordinator, SwitchToken};
pub use time_range::TimeRange;
