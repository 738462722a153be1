use std::sync::Arc;

use cel_test_fixtures::{
    EventRecorder, ImmediateExecutor, NullUpdater, SceneArena, StubChannel,
};
use cel_timeline_core::{
    AnimationEvent, NodeId, Rect, SceneGraph, TimeRange, Timeline, TimelineConfig,
};

fn dirty_rect() -> Rect {
    Rect::new(4, 4, 16, 16)
}

fn make_timeline(scene: Arc<SceneArena>) -> Timeline {
    Timeline::new(
        TimelineConfig::default(),
        scene,
        ImmediateExecutor::new(),
        NullUpdater::new(),
        None,
    )
}

fn frames_changed(events: &[AnimationEvent]) -> Vec<(TimeRange, Rect)> {
    events
        .iter()
        .filter_map(|event| match event {
            AnimationEvent::FramesChanged { range, rect } => Some((*range, *rect)),
            _ => None,
        })
        .collect()
}

#[test]
fn external_frame_suppresses_invalidation() {
    let scene = SceneArena::new();
    let layer = scene.add_node(scene.root());
    let timeline = make_timeline(scene);
    let recorder = EventRecorder::attach(&timeline);

    let saved = timeline.save_and_reset_current_time(5);
    timeline.notify_node_changed(layer, dirty_rect(), false);
    assert!(recorder.events().is_empty(), "suppressed while external frame active");

    timeline.restore_current_time(saved);
    timeline.notify_node_changed(layer, dirty_rect(), false);
    assert_eq!(frames_changed(&recorder.events()).len(), 1);
}

#[test]
fn external_frame_scope_restores_on_drop() {
    let scene = SceneArena::new();
    let timeline = make_timeline(scene);

    {
        let _scope = timeline.external_frame_scope(7);
        assert_eq!(timeline.current_time(), 7);
        assert!(timeline.external_frame_active());
    }
    assert_eq!(timeline.current_time(), 0);
    assert!(!timeline.external_frame_active());
}

#[test]
fn explicit_block_suppresses_invalidation() {
    let scene = SceneArena::new();
    let layer = scene.add_node(scene.root());
    let timeline = make_timeline(scene);
    let recorder = EventRecorder::attach(&timeline);

    timeline.block_frame_invalidation(true);
    timeline.notify_node_changed(layer, dirty_rect(), false);
    assert!(recorder.events().is_empty());

    timeline.block_frame_invalidation(false);
    timeline.notify_node_changed(layer, dirty_rect(), false);
    assert_eq!(frames_changed(&recorder.events()).len(), 1);
}

#[test]
fn excluded_nodes_never_invalidate() {
    let scene = SceneArena::new();
    let mask = scene.add_node(scene.root());
    scene.set_affects_animation(mask, false);
    let timeline = make_timeline(scene);
    let recorder = EventRecorder::attach(&timeline);

    timeline.notify_node_changed(mask, dirty_rect(), false);
    timeline.notify_node_changed(mask, dirty_rect(), true);
    assert!(recorder.events().is_empty());
}

#[test]
fn content_channel_scopes_the_invalidated_range() {
    let scene = SceneArena::new();
    let layer = scene.add_node(scene.root());
    scene.add_channel(layer, StubChannel::content(vec![0, 10, 20]));
    let timeline = make_timeline(scene);
    let recorder = EventRecorder::attach(&timeline);

    // Engine time 0: the active key at 0 holds until the key at 10.
    timeline.notify_node_changed(layer, dirty_rect(), false);
    assert_eq!(
        frames_changed(&recorder.events()),
        vec![(TimeRange::from_time(0, 9), dirty_rect())]
    );
}

#[test]
fn recursive_invalidation_unions_the_subtree() {
    let scene = SceneArena::new();
    let group = scene.add_node(scene.root());
    let a = scene.add_node(group);
    scene.add_channel(a, StubChannel::content(vec![0, 10]));
    let b = scene.add_node(group);
    scene.add_channel(b, StubChannel::content(vec![0, 30]));
    let timeline = make_timeline(scene);
    let recorder = EventRecorder::attach(&timeline);

    timeline.notify_node_changed(group, dirty_rect(), true);
    assert_eq!(
        frames_changed(&recorder.events()),
        vec![(TimeRange::from_time(0, 29), dirty_rect())]
    );
}

#[test]
fn node_without_content_channel_invalidates_everything() {
    let scene = SceneArena::new();
    let layer = scene.add_node(scene.root());
    let timeline = make_timeline(scene);
    let recorder = EventRecorder::attach(&timeline);

    timeline.notify_node_changed(layer, dirty_rect(), false);
    assert_eq!(
        frames_changed(&recorder.events()),
        vec![(TimeRange::infinite(0), dirty_rect())]
    );
}

#[test]
fn validity_window_intersects_subtree_channels() {
    let scene = SceneArena::new();
    let a = scene.add_node(scene.root());
    scene.add_channel(a, StubChannel::content(vec![0, 10]));
    let b = scene.add_node(scene.root());
    scene.add_channel(b, StubChannel::content(vec![0, 25]));

    let range = TimeRange::calculate_recursive(scene.as_ref(), NodeId(0), 0, true);
    assert_eq!(range, TimeRange::from_time(0, 9));

    // A scene without any keyframes is valid forever.
    let bare = SceneArena::new();
    let range = TimeRange::calculate_recursive(bare.as_ref(), NodeId(0), 0, true);
    assert!(range.is_infinite());
}

#[test]
fn invalidation_resets_length_memoization() {
    let scene = SceneArena::new();
    let layer = scene.add_node(scene.root());
    let channel = StubChannel::content(vec![0, 10]);
    scene.add_channel(layer, channel.clone());
    let timeline = make_timeline(scene);

    assert_eq!(timeline.total_length(), 101, "clip range dominates");

    // A new key past the clip end is invisible until an invalidating
    // mutation drops the memoized value.
    channel.add_key(150);
    assert_eq!(timeline.total_length(), 101);

    timeline.notify_node_changed(layer, dirty_rect(), false);
    assert_eq!(timeline.total_length(), 151);
}
