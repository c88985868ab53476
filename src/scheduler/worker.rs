//! A single worker thread with its own FIFO task queue.
//!
//! The worker sleeps on a condition variable while its queue is empty and
//! wakes for "task available or stopping". On shutdown it drains everything
//! already queued before the thread exits, so submitted work is never lost to
//! a graceful stop.

use super::task::{CancelToken, Task};
use parking_lot::{Condvar, Mutex};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use tracing::{error, trace};

/// Identifier of a worker thread, e.g. `"OB_Worker_3"`.
pub type WorkerId = String;

/// Bookkeeping of queued and in-flight task ids plus their cancel tokens.
#[derive(Default)]
struct TaskBook {
    pending: HashSet<u64>,
    running: HashSet<u64>,
    tokens: HashMap<u64, CancelToken>,
}

/// State shared between the worker thread and its submitters.
struct WorkerShared {
    queue: Mutex<VecDeque<Task>>,
    available: Condvar,
    stop: AtomicBool,
    book: Mutex<TaskBook>,
}

/// Owner of one worker thread and its queue.
pub struct Worker {
    id: WorkerId,
    shared: Arc<WorkerShared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Worker {
    /// Create a worker; its thread starts only on [`Self::start`].
    pub fn new(id: impl Into<WorkerId>) -> Self {
        Self {
            id: id.into(),
            shared: Arc::new(WorkerShared {
                queue: Mutex::new(VecDeque::new()),
                available: Condvar::new(),
                stop: AtomicBool::new(false),
                book: Mutex::new(TaskBook::default()),
            }),
            handle: Mutex::new(None),
        }
    }

    /// This worker's identifier.
    pub fn id(&self) -> &WorkerId {
        &self.id
    }

    /// Launch the worker thread. Idempotent: a second call is a no-op.
    ///
    /// The handle mutex guards against concurrent `start`/`shutdown` calls
    /// from different threads.
    pub fn start(&self) {
        let mut handle = self.handle.lock();
        if handle.is_some() {
            return;
        }
        let shared = Arc::clone(&self.shared);
        let id = self.id.clone();
        let spawned = std::thread::Builder::new()
            .name(id.clone())
            .spawn(move || run_loop(&shared, &id));
        match spawned {
            Ok(join_handle) => *handle = Some(join_handle),
            Err(err) => error!(worker = %self.id, %err, "failed to spawn worker thread"),
        }
    }

    /// Enqueue a task and wake the worker.
    pub fn submit(&self, task: Task) {
        {
            let mut book = self.shared.book.lock();
            book.pending.insert(task.id);
            book.tokens.insert(task.id, task.token.clone());
        }
        self.shared.queue.lock().push_back(task);
        self.shared.available.notify_one();
    }

    /// Number of tasks waiting in the queue.
    pub fn pending_tasks(&self) -> usize {
        self.shared.queue.lock().len()
    }

    /// Request cancellation of a queued or running task. Returns `false` when
    /// the task is unknown (never submitted or already finished).
    pub fn cancel_task(&self, task_id: u64) -> bool {
        let book = self.shared.book.lock();
        match book.tokens.get(&task_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Signal the worker to stop once its queue drains.
    pub fn stop(&self) {
        self.shared.stop.store(true, Ordering::Release);
        self.shared.available.notify_all();
    }

    /// Wait for the worker thread to exit.
    pub fn join(&self) {
        let handle = self.handle.lock().take();
        if let Some(handle) = handle
            && handle.join().is_err()
        {
            error!(worker = %self.id, "worker thread panicked");
        }
    }

    /// Stop and join.
    pub fn shutdown(&self) {
        self.stop();
        self.join();
    }
}

/// The worker main loop: wait for "stop or task", pop one task, run it with
/// the queue lock released.
fn run_loop(shared: &WorkerShared, worker_id: &str) {
    loop {
        let task = {
            let mut queue = shared.queue.lock();
            while queue.is_empty() && !shared.stop.load(Ordering::Acquire) {
                shared.available.wait(&mut queue);
            }
            match queue.pop_front() {
                Some(task) => task,
                // Stopping and fully drained.
                None => return,
            }
        };

        {
            let mut book = shared.book.lock();
            book.pending.remove(&task.id);
            book.running.insert(task.id);
        }

        let task_id = task.id;
        if task.token.is_cancelled() {
            trace!(worker = worker_id, task = task_id, "skipping cancelled task");
        } else {
            trace!(
                worker = worker_id,
                task = task_id,
                description = %task.description,
                "executing task"
            );
            task.execute();
        }

        let mut book = shared.book.lock();
        book.running.remove(&task_id);
        book.tokens.remove(&task_id);
    }
}
