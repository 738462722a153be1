//! Deterministic executors.
//!
//! `ManualExecutor` models the per-scene ordered task sequence without
//! threads: submitted tasks queue in order until the test drives them.
//! `ImmediateExecutor` runs every task inline at submission, which makes
//! coalescing windows zero-length.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use cel_timeline_core::{SceneTask, TaskExecutor, TaskHandle};

pub struct ImmediateExecutor {
    next: AtomicU64,
}

impl ImmediateExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next: AtomicU64::new(0),
        })
    }
}

impl TaskExecutor for ImmediateExecutor {
    fn submit(&self, task: Box<dyn SceneTask>) -> TaskHandle {
        let handle = TaskHandle(self.next.fetch_add(1, Ordering::SeqCst));
        task.run();
        handle
    }
}

pub struct ManualExecutor {
    queue: Mutex<VecDeque<(TaskHandle, Box<dyn SceneTask>)>>,
    next: AtomicU64,
}

impl ManualExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(VecDeque::new()),
            next: AtomicU64::new(0),
        })
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// Run the oldest queued task. Tasks may submit follow-up work, so the
    /// queue lock is released before running.
    pub fn run_next(&self) -> bool {
        let entry = self.queue.lock().unwrap().pop_front();
        match entry {
            Some((_, task)) => {
                task.run();
                true
            }
            None => false,
        }
    }

    /// Drain the queue, including tasks submitted while draining. Returns
    /// how many tasks ran.
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }

    /// Discard every queued task through its cancellation path. Returns how
    /// many tasks were cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<_> = self.queue.lock().unwrap().drain(..).collect();
        let count = drained.len();
        for (_, task) in drained {
            task.cancelled();
        }
        count
    }
}

impl TaskExecutor for ManualExecutor {
    fn submit(&self, task: Box<dyn SceneTask>) -> TaskHandle {
        let handle = TaskHandle(self.next.fetch_add(1, Ordering::SeqCst));
        self.queue.lock().unwrap().push_back((handle, task));
        handle
    }

    /// Runs queued tasks in order up to and including `handle`. If `handle`
    /// already ran the queue is drained, which is the conservative reading
    /// of "block until done" for a queue without completion records.
    fn wait(&self, handle: TaskHandle) {
        loop {
            let entry = self.queue.lock().unwrap().pop_front();
            match entry {
                Some((ran, task)) => {
                    task.run();
                    if ran == handle {
                        return;
                    }
                }
                None => return,
            }
        }
    }
}
