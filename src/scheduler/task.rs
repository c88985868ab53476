//! Tasks executed by worker threads.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Move-only callable a worker executes, receiving the task's cancel token.
pub type TaskFn = Box<dyn FnOnce(&CancelToken) + Send + 'static>;

/// Shared cancellation flag for one task.
///
/// Setting it does not preempt anything: the executing body (and the worker,
/// before starting the task) may observe it and exit early.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// True once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// A unit of work queued on a worker.
pub struct Task {
    /// Scheduler-assigned identifier, unique per scheduler.
    pub id: u64,
    /// The work itself, owning its captures.
    pub func: TaskFn,
    /// Cooperative cancellation flag.
    pub token: CancelToken,
    /// Human-readable description for logs.
    pub description: String,
}

impl Task {
    /// Build a task with a fresh cancel token.
    pub fn new(id: u64, func: TaskFn, description: impl Into<String>) -> Self {
        Self {
            id,
            func,
            token: CancelToken::new(),
            description: description.into(),
        }
    }

    /// Consume and run the task.
    pub fn execute(self) {
        (self.func)(&self.token);
    }
}
