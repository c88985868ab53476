//! Scheduler core: a registry of named workers and task submission.

use super::task::{CancelToken, Task};
use super::worker::{Worker, WorkerId};
use crate::orders::Symbol;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Errors raised by the scheduling layer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchedulerError {
    /// A worker with this id already exists; duplicate creation is a startup
    /// bug and treated as fatal by the application.
    WorkerAlreadyExists {
        /// The conflicting worker id.
        worker_id: WorkerId,
    },

    /// No worker with this id is registered.
    WorkerNotFound {
        /// The missing worker id.
        worker_id: WorkerId,
    },

    /// No worker is assigned to this symbol; the submission fails but the
    /// process continues.
    NoWorkerForSymbol {
        /// The unassigned symbol.
        symbol: Symbol,
    },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::WorkerAlreadyExists { worker_id } => {
                write!(f, "worker already exists: {worker_id}")
            }
            SchedulerError::WorkerNotFound { worker_id } => {
                write!(f, "worker not found: {worker_id}")
            }
            SchedulerError::NoWorkerForSymbol { symbol } => {
                write!(f, "no worker mapping for symbol: {symbol}")
            }
        }
    }
}

impl std::error::Error for SchedulerError {}

/// Owns a set of named workers and routes tasks to them by id.
#[derive(Default)]
pub struct SchedulerCore {
    workers: RwLock<HashMap<WorkerId, Arc<Worker>>>,
    next_task_id: AtomicU64,
}

impl SchedulerCore {
    /// An empty scheduler with no workers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a single worker.
    ///
    /// # Errors
    /// [`SchedulerError::WorkerAlreadyExists`] when the id is taken.
    pub fn create_worker(&self, id: &str) -> Result<(), SchedulerError> {
        let mut workers = self.workers.write();
        if workers.contains_key(id) {
            return Err(SchedulerError::WorkerAlreadyExists {
                worker_id: id.to_string(),
            });
        }
        workers.insert(id.to_string(), Arc::new(Worker::new(id)));
        debug!(worker = id, "worker created");
        Ok(())
    }

    /// Replace any existing workers with `count` fresh ones named
    /// `prefix_0 .. prefix_{count-1}`.
    pub fn create_workers(&self, prefix: &str, count: usize) -> Result<(), SchedulerError> {
        {
            let mut workers = self.workers.write();
            if !workers.is_empty() {
                workers.clear();
            }
        }
        for index in 0..count {
            self.create_worker(&format!("{prefix}_{index}"))?;
        }
        Ok(())
    }

    /// Number of registered workers.
    pub fn worker_count(&self) -> usize {
        self.workers.read().len()
    }

    /// Ids of all registered workers.
    pub fn worker_ids(&self) -> Vec<WorkerId> {
        self.workers.read().keys().cloned().collect()
    }

    /// True when a worker with this id is registered.
    pub fn has_worker(&self, id: &str) -> bool {
        self.workers.read().contains_key(id)
    }

    /// Start every registered worker's thread.
    pub fn start(&self) {
        for worker in self.workers.read().values() {
            worker.start();
        }
        info!(workers = self.worker_count(), "scheduler started");
    }

    /// Submit a task to the named worker. Returns the assigned task id.
    ///
    /// # Errors
    /// [`SchedulerError::WorkerNotFound`] when no such worker exists.
    pub fn submit_to(
        &self,
        worker_id: &str,
        func: impl FnOnce(&CancelToken) + Send + 'static,
        description: impl Into<String>,
    ) -> Result<u64, SchedulerError> {
        let worker = self.worker(worker_id)?;
        let task_id = self.next_task_id.fetch_add(1, Ordering::Relaxed);
        worker.submit(Task::new(task_id, Box::new(func), description));
        Ok(task_id)
    }

    /// Request cancellation of a task previously submitted to `worker_id`.
    pub fn cancel_task(&self, worker_id: &str, task_id: u64) -> Result<bool, SchedulerError> {
        Ok(self.worker(worker_id)?.cancel_task(task_id))
    }

    /// Queued-task count for one worker.
    pub fn pending_tasks(&self, worker_id: &str) -> Result<usize, SchedulerError> {
        Ok(self.worker(worker_id)?.pending_tasks())
    }

    /// Stop all workers and join their threads. Queued tasks are drained
    /// before each thread exits.
    pub fn shutdown(&self) {
        let workers: Vec<Arc<Worker>> = self.workers.read().values().cloned().collect();
        // Signal every worker before joining any, so they drain in parallel.
        for worker in &workers {
            worker.stop();
        }
        for worker in &workers {
            worker.join();
        }
        info!(workers = workers.len(), "scheduler shut down");
    }

    fn worker(&self, id: &str) -> Result<Arc<Worker>, SchedulerError> {
        self.workers
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| SchedulerError::WorkerNotFound {
                worker_id: id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn test_duplicate_worker_is_rejected() {
        let core = SchedulerCore::new();
        core.create_worker("w_0").unwrap();
        let err = core.create_worker("w_0").unwrap_err();
        assert_eq!(
            err,
            SchedulerError::WorkerAlreadyExists {
                worker_id: "w_0".to_string()
            }
        );
    }

    #[test]
    fn test_create_workers_names_by_prefix() {
        let core = SchedulerCore::new();
        core.create_workers("OB_Worker", 3).unwrap();
        assert_eq!(core.worker_count(), 3);
        assert!(core.has_worker("OB_Worker_0"));
        assert!(core.has_worker("OB_Worker_2"));
        assert!(!core.has_worker("OB_Worker_3"));

        // Re-creating replaces the previous set.
        core.create_workers("Injector", 1).unwrap();
        assert_eq!(core.worker_count(), 1);
        assert!(!core.has_worker("OB_Worker_0"));
    }

    #[test]
    fn test_submit_to_unknown_worker_fails() {
        let core = SchedulerCore::new();
        let err = core.submit_to("ghost", |_| {}, "noop").unwrap_err();
        assert!(matches!(err, SchedulerError::WorkerNotFound { .. }));
    }

    #[test]
    fn test_submitted_tasks_execute_on_their_worker() {
        let core = SchedulerCore::new();
        core.create_workers("w", 2).unwrap();
        core.start();

        let counter = Arc::new(AtomicU64::new(0));
        for index in 0..20u64 {
            let counter = Arc::clone(&counter);
            let worker = format!("w_{}", index % 2);
            core.submit_to(
                &worker,
                move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                },
                "count",
            )
            .unwrap();
        }

        core.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_task_ids_are_unique() {
        let core = SchedulerCore::new();
        core.create_worker("w_0").unwrap();
        let first = core.submit_to("w_0", |_| {}, "a").unwrap();
        let second = core.submit_to("w_0", |_| {}, "b").unwrap();
        assert_ne!(first, second);
        core.shutdown();
    }
}
