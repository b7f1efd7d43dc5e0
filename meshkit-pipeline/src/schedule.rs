//! Budgeted task queue
//!
//! A caller-owned FIFO of deferred jobs. Each call to
//! [`TaskQueue::run_for`] drains tasks until the queue is empty or the
//! wall-clock budget is used up. A task that has started always runs to
//! completion, so a tick can overshoot its budget by one task.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

/// A deferred unit of work
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// FIFO of deferred tasks drained under a time budget
#[derive(Default)]
pub struct TaskQueue {
    tasks: VecDeque<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task to the back of the queue
    pub fn schedule<F>(&mut self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.tasks.push_back(Box::new(task));
    }

    /// Number of pending tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run tasks in order until the queue is empty or `budget` has elapsed.
    ///
    /// At least one task runs when the queue is non-empty, even with a zero
    /// budget. Returns the number of tasks run.
    pub fn run_for(&mut self, budget: Duration) -> usize {
        let start = Instant::now();
        let mut ran = 0;
        while let Some(task) = self.tasks.pop_front() {
            task();
            ran += 1;
            if start.elapsed() >= budget {
                break;
            }
        }
        debug!(
            ran,
            remaining = self.tasks.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "task queue tick"
        );
        ran
    }

    /// Run every pending task regardless of time
    pub fn run_all(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.tasks.pop_front() {
            task();
            ran += 1;
        }
        ran
    }

    /// Drop every pending task without running it
    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.tasks.len())
            .finish()
    }
}
