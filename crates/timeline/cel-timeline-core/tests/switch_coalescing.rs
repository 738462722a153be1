use std::sync::{Arc, Barrier};
use std::thread;

use cel_test_fixtures::{
    EventRecorder, ManualExecutor, RecordingUndo, RecordingUpdater, SceneArena, StubChannel,
};
use cel_timeline_core::{
    AnimationEvent, NodeId, Rect, SceneGraph, Timeline, TimelineConfig, UndoAdapter,
};

/// Scene with one animated layer whose content channel holds the given key
/// times. With keys `[0, 20]` the validity window around time 0 is `[0, 19]`.
fn scene_with_keys(keys: Vec<i32>) -> (Arc<SceneArena>, NodeId) {
    let scene = SceneArena::new();
    let layer = scene.add_node(scene.root());
    scene.add_channel(layer, StubChannel::content(keys));
    (scene, layer)
}

struct Setup {
    timeline: Timeline,
    executor: Arc<ManualExecutor>,
    updater: Arc<RecordingUpdater>,
    recorder: Arc<EventRecorder>,
}

fn setup(keys: Vec<i32>, undo: Option<Arc<RecordingUndo>>) -> Setup {
    let (scene, _) = scene_with_keys(keys);
    let executor = ManualExecutor::new();
    let updater = RecordingUpdater::new();
    let timeline = Timeline::new(
        TimelineConfig::default(),
        scene,
        executor.clone(),
        updater.clone(),
        undo.map(|u| u as Arc<dyn UndoAdapter>),
    );
    let recorder = EventRecorder::attach(&timeline);
    Setup {
        timeline,
        executor,
        updater,
        recorder,
    }
}

#[test]
fn same_time_request_is_noop() {
    let s = setup(vec![0, 20], None);

    s.timeline.request_time_switch(0, false);
    assert_eq!(s.executor.pending(), 0, "no task for the current time");
    assert!(s.recorder.events().is_empty());

    // Negative destinations clamp to 0, which is already current.
    s.timeline.request_time_switch(-3, false);
    assert_eq!(s.executor.pending(), 0);
    assert!(s.recorder.events().is_empty());
}

#[test]
fn ui_time_advances_optimistically_before_task_runs() {
    let s = setup(vec![0, 20], None);

    s.timeline.request_time_switch(10, false);
    assert_eq!(s.timeline.current_ui_time(), 10);
    assert_eq!(s.timeline.current_time(), 0, "engine time lags until the task runs");

    s.executor.run_all();
    assert_eq!(s.timeline.current_time(), 10);
}

#[test]
fn burst_runs_single_task_landing_on_last_request() {
    let s = setup(vec![0, 20], None);

    // All destinations are inside the validity window [0, 19].
    s.timeline.request_time_switch(10, false);
    s.timeline.request_time_switch(5, false);
    s.timeline.request_time_switch(15, false);
    assert_eq!(s.executor.pending(), 1, "burst coalesces onto one task");

    let ran = s.executor.run_all();
    assert_eq!(ran, 1);
    assert_eq!(s.timeline.current_time(), 15);
    assert_eq!(s.timeline.current_ui_time(), 15);
    assert_eq!(s.recorder.ui_times(), vec![15], "superseded destinations are absorbed");
    assert!(s.updater.refreshes().is_empty(), "no regeneration needed");
}

#[test]
fn pending_switch_superseded_by_far_destination() {
    let s = setup(vec![0, 20], None);

    s.timeline.request_time_switch(10, false);
    s.timeline.request_time_switch(50, false);
    assert_eq!(s.executor.pending(), 1);

    s.executor.run_all();
    assert_eq!(s.timeline.current_time(), 50);
    assert_eq!(s.recorder.ui_times(), vec![50]);
    assert!(!s
        .recorder
        .events()
        .contains(&AnimationEvent::UiTimeChanged { time: 10 }));
    // 50 lies outside [0, 19]; the switch task queued the regeneration
    // deferred, since none was submitted with the original request.
    assert_eq!(s.updater.refreshes().len(), 1);
}

#[test]
fn switch_outside_validity_queues_regeneration() {
    let s = setup(vec![0, 20], None);

    s.timeline.request_time_switch(50, false);
    assert_eq!(s.executor.pending(), 2, "switch task plus regeneration task");

    s.executor.run_all();
    let refreshes = s.updater.refreshes();
    assert_eq!(refreshes.len(), 1);
    assert_eq!(refreshes[0].1, Rect::new(0, 0, 512, 512), "whole scene bounds");
    assert!(!s
        .recorder
        .events()
        .iter()
        .any(|event| matches!(event, AnimationEvent::FramesChanged { .. })));
}

#[test]
fn switch_within_validity_skips_regeneration() {
    let s = setup(vec![0, 20], None);

    s.timeline.request_time_switch(10, false);
    assert_eq!(s.executor.pending(), 1);

    s.executor.run_all();
    assert!(s.updater.refreshes().is_empty());
}

#[test]
fn started_task_is_not_resettable() {
    let s = setup(vec![0, 20], None);

    s.timeline.request_time_switch(10, false);
    s.executor.run_all();

    s.timeline.request_time_switch(5, false);
    assert_eq!(s.executor.pending(), 1, "second request needs a fresh task");
    s.executor.run_all();
    assert_eq!(s.recorder.ui_times(), vec![10, 5]);
}

#[test]
fn concurrent_requests_agree_with_realized_time() {
    // Two racing requests inside the validity window: whichever reset wins
    // under the coordinator lock must also own the final UI time, so the
    // realized destination and `current_ui_time` never diverge.
    for _ in 0..200 {
        let s = setup(vec![0, 20], None);
        let barrier = Barrier::new(2);

        thread::scope(|scope| {
            for time in [5, 7] {
                let timeline = s.timeline.clone();
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    timeline.request_time_switch(time, false);
                });
            }
        });

        s.executor.run_all();
        let realized = *s.recorder.ui_times().last().expect("a switch task ran");
        assert_eq!(s.timeline.current_ui_time(), realized);
        assert_eq!(s.timeline.current_time(), realized);
    }
}

#[test]
fn undoable_switch_commits_through_adapter() {
    let undo = RecordingUndo::new();
    let s = setup(vec![0, 20], Some(undo.clone()));

    s.timeline.request_time_switch_with_undo(10);
    s.executor.run_all();
    assert_eq!(undo.commits(), vec![(0, 10)]);

    // Non-undoable switches leave the log untouched.
    s.timeline.request_time_switch(15, false);
    s.executor.run_all();
    assert_eq!(undo.commits(), vec![(0, 10)]);
}
