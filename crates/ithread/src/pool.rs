//! `WorkerPool` - fixed-size pool of persistent worker threads
//!
//! Spawns N OS threads at creation. Submissions are bound into tasks,
//! pushed onto one shared two-lock queue, and picked up by whichever
//! worker is idle; the caller gets a `TaskHandle` per submission.
//!
//! Shutdown closes the queue, which lets workers drain everything
//! submitted beforehand and then exit; later submissions fail with
//! `PoolStopped`. No dynamic scaling.

use std::sync::Arc;
use std::thread;

use ithread_core::constants::MAX_WORKERS;
use ithread_core::env::env_get;
use ithread_core::error::{TaskError, TaskResult};
use ithread_core::oneshot::TaskHandle;
use ithread_core::queue::TwoLockQueue;
use ithread_core::task::Task;
use ithread_core::{kdebug, kinfo, kwarn};

/// Fixed-size worker pool
///
/// **Contract:**
/// - `submit()` never blocks beyond queue lock hold time.
/// - Every task submitted before shutdown began is executed; tasks are
///   rejected afterwards, never silently dropped.
/// - A panicking task fails only its own handle; the worker survives.
/// - Drop shuts down and joins every worker.
pub struct WorkerPool {
    queue: Arc<TwoLockQueue<Task>>,
    workers: JoinGuard,
}

impl WorkerPool {
    /// Create a pool with `workers` threads, clamped to 1..=MAX_WORKERS
    pub fn new(workers: usize) -> Self {
        let workers = workers.clamp(1, MAX_WORKERS);
        let queue = Arc::new(TwoLockQueue::new());

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let queue = Arc::clone(&queue);
            let handle = thread::Builder::new()
                .name(format!("ith-worker-{}", worker_id))
                .spawn(move || worker_loop(queue, worker_id))
                .expect("failed to spawn worker thread");
            handles.push(handle);
        }

        WorkerPool {
            queue,
            workers: JoinGuard { handles },
        }
    }

    /// Default sizing: `ITH_WORKERS` env override, else one worker per
    /// available hardware execution unit
    pub fn with_default_size() -> Self {
        let cpus = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self::new(env_get("ITH_WORKERS", cpus))
    }

    /// Bind a callable and hand it to the pool
    ///
    /// Returns the handle its result will arrive on, or `PoolStopped`
    /// once shutdown has begun.
    pub fn submit<F, R>(&self, f: F) -> TaskResult<TaskHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (task, handle) = Task::bind(f);
        match self.queue.push(task) {
            Ok(()) => Ok(handle),
            Err(TaskError::QueueClosed) => Err(TaskError::PoolStopped),
            Err(e) => Err(e),
        }
    }

    /// Close the queue, let workers drain it, and join them
    ///
    /// Idempotent; also runs from `Drop`.
    pub fn shutdown(&mut self) {
        if !self.queue.is_closed() {
            kinfo!("pool shutting down, {} task(s) pending", self.queue.len());
        }
        self.queue.close();
        self.workers.join_all();
    }

    /// Number of tasks queued but not yet picked up; diagnostics only
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of worker threads
    pub fn workers(&self) -> usize {
        self.workers.handles.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Joins every held thread when asked or when dropped
///
/// Keeps workers joined even if pool construction or shutdown unwinds
/// partway through.
struct JoinGuard {
    handles: Vec<thread::JoinHandle<()>>,
}

impl JoinGuard {
    fn join_all(&mut self) {
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                kwarn!("worker thread panicked outside a task");
            }
        }
    }
}

impl Drop for JoinGuard {
    fn drop(&mut self) {
        self.join_all();
    }
}

/// Worker thread main loop: wait, execute, repeat until closed and drained
fn worker_loop(queue: Arc<TwoLockQueue<Task>>, worker_id: usize) {
    kdebug!("worker {} started", worker_id);
    loop {
        match queue.wait_and_pop() {
            // Task::run captures user panics into the task's handle, so
            // nothing here can take the worker down.
            Ok(task) => task.run(),
            Err(_) => break,
        }
    }
    kdebug!("worker {} exiting", worker_id);
}
