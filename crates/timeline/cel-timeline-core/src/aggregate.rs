//! Read-only aggregation over the scene tree.
//!
//! Pure traversals, O(nodes x channels). Iterative with an explicit stack;
//! scene depth must not bound recursion.

use crate::scene::SceneGraph;

/// Latest keyframe time across every channel of every node, 0 when the
/// scene has no keyframes at all.
pub fn find_last_keyframe_time(scene: &dyn SceneGraph) -> i32 {
    let mut last = 0;
    let mut stack = vec![scene.root()];

    while let Some(node) = stack.pop() {
        for channel in scene.channels(node) {
            if let Some(time) = channel.last_keyframe_time() {
                last = last.max(time);
            }
        }
        stack.extend(scene.children(node));
    }

    last
}

/// Whether any node in the scene is animated.
pub fn has_animation(scene: &dyn SceneGraph) -> bool {
    let mut stack = vec![scene.root()];

    while let Some(node) = stack.pop() {
        if scene.is_animated(node) {
            return true;
        }
        stack.extend(scene.children(node));
    }

    false
}
