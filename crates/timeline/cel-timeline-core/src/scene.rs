//! Collaborator traits for the scene graph.
//!
//! The core never owns scene content; it walks a tree of nodes through
//! `SceneGraph`, reads per-node keyframe data through `KeyframeChannel`, and
//! hands refresh work to a `ProjectionUpdater`. Hosts implement these over
//! their own storage; the fixtures crate provides in-memory versions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::rect::Rect;
use crate::time_range::TimeRange;

/// Channel id of the content channel, the one consulted for frame
/// invalidation when a node changes non-recursively.
pub const CONTENT_CHANNEL: &str = "content";

/// Dense node identifier within one scene. Opaque to the core.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// A per-node stream of discrete time-stamped content changes.
pub trait KeyframeChannel: Send + Sync {
    /// Stable channel id, e.g. [`CONTENT_CHANNEL`].
    fn id(&self) -> &str;

    /// Time of the latest keyframe, `None` when the channel is empty.
    fn last_keyframe_time(&self) -> Option<i32>;

    /// Span of frames whose rendered content is affected by a change made
    /// at `time`.
    fn affected_range(&self, time: i32) -> TimeRange;

    /// Maximal span around `time` during which this channel holds constant
    /// content.
    fn identical_range(&self, time: i32) -> TimeRange;
}

/// Read-only view of the scene tree. Scene graphs are trees, not general
/// graphs; implementations must not report cycles.
pub trait SceneGraph: Send + Sync {
    fn root(&self) -> NodeId;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Pixel bounds of the whole scene, used for whole-scene regeneration.
    fn bounds(&self) -> Rect;

    /// Whether the node carries any keyframe channel.
    fn is_animated(&self, node: NodeId) -> bool;

    /// Whether changes to this node affect animation frames at all.
    /// Selection-mask-like helper nodes return false.
    fn affects_animation(&self, node: NodeId) -> bool {
        let _ = node;
        true
    }

    fn channels(&self, node: NodeId) -> Vec<Arc<dyn KeyframeChannel>>;

    fn channel(&self, node: NodeId, id: &str) -> Option<Arc<dyn KeyframeChannel>>;
}

/// Sink that actually recomputes projected frame content. Compositing is
/// out of scope for the core; regeneration tasks only call into this.
pub trait ProjectionUpdater: Send + Sync {
    fn refresh(&self, root: NodeId, region: Rect);
}
