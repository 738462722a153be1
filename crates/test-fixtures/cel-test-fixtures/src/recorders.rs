//! Recording sinks for assertions.

use std::sync::{Arc, Mutex};

use cel_timeline_core::{
    AnimationEvent, NodeId, ProjectionUpdater, Rect, Timeline, UndoAdapter,
};

/// Captures every event a timeline emits, in delivery order.
pub struct EventRecorder {
    events: Mutex<Vec<AnimationEvent>>,
}

impl EventRecorder {
    pub fn attach(timeline: &Timeline) -> Arc<Self> {
        let recorder = Arc::new(Self {
            events: Mutex::new(Vec::new()),
        });
        let sink = Arc::clone(&recorder);
        timeline.subscribe(move |event| sink.events.lock().unwrap().push(event.clone()));
        recorder
    }

    pub fn events(&self) -> Vec<AnimationEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Drain recorded events, for staged assertions.
    pub fn take(&self) -> Vec<AnimationEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    /// Times carried by recorded `UiTimeChanged` events, in order.
    pub fn ui_times(&self) -> Vec<i32> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                AnimationEvent::UiTimeChanged { time } => Some(time),
                _ => None,
            })
            .collect()
    }
}

/// Projection updater that records each requested refresh.
pub struct RecordingUpdater {
    refreshes: Mutex<Vec<(NodeId, Rect)>>,
}

impl RecordingUpdater {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            refreshes: Mutex::new(Vec::new()),
        })
    }

    pub fn refreshes(&self) -> Vec<(NodeId, Rect)> {
        self.refreshes.lock().unwrap().clone()
    }
}

impl ProjectionUpdater for RecordingUpdater {
    fn refresh(&self, root: NodeId, region: Rect) {
        self.refreshes.lock().unwrap().push((root, region));
    }
}

/// Projection updater that ignores refreshes.
pub struct NullUpdater;

impl NullUpdater {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl ProjectionUpdater for NullUpdater {
    fn refresh(&self, _root: NodeId, _region: Rect) {}
}

/// Undo adapter that records committed time switches.
pub struct RecordingUndo {
    commits: Mutex<Vec<(i32, i32)>>,
}

impl RecordingUndo {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            commits: Mutex::new(Vec::new()),
        })
    }

    /// Recorded `(from, to)` pairs, in commit order.
    pub fn commits(&self) -> Vec<(i32, i32)> {
        self.commits.lock().unwrap().clone()
    }
}

impl UndoAdapter for RecordingUndo {
    fn commit_time_switch(&self, from: i32, to: i32) {
        self.commits.lock().unwrap().push((from, to));
    }
}
