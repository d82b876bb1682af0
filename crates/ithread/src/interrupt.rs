//! `InterruptibleWorker` - one long-lived callable on a dedicated thread
//!
//! The simpler lane next to `WorkerPool`, for when a single task must be
//! cancellable mid-wait rather than pooled. The worker thread owns an
//! `InterruptFlag` and passes it to the callable, which observes it at
//! interruption points and inside interruptible waits; `interrupt()`
//! sets it from outside.
//!
//! The thread hands its flag back to the owner through a oneshot
//! *before* the callable starts, so an `interrupt()` racing with startup
//! can never miss the flag.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use ithread_core::cancel::InterruptFlag;
use ithread_core::error::{TaskError, TaskResult};
use ithread_core::kwarn;
use ithread_core::oneshot::{oneshot, TaskHandle};
use ithread_core::task::panic_message;

type WorkerFn<R> = Box<dyn FnOnce(&InterruptFlag) -> TaskResult<R> + Send + 'static>;
type FailureFn = Box<dyn FnOnce() + Send + 'static>;

/// A dedicated worker thread that can be asked to unwind out of a
/// blocking wait
///
/// Exactly one of {value, failure} is captured into the result channel;
/// a callable failure (error return or panic) additionally invokes the
/// failure callback on the worker thread.
pub struct InterruptibleWorker<R> {
    callable: Option<WorkerFn<R>>,
    on_failure: Option<FailureFn>,
    started: bool,
    flag: Option<Arc<InterruptFlag>>,
    thread: Option<thread::JoinHandle<()>>,
    result: Option<TaskHandle<R>>,
}

impl<R: Send + 'static> InterruptibleWorker<R> {
    /// Store the callable; nothing runs until `run()`
    ///
    /// The callable receives the worker thread's own flag and is
    /// expected to propagate `Err(Cancelled)` from its interruption
    /// points with `?`.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&InterruptFlag) -> TaskResult<R> + Send + 'static,
    {
        InterruptibleWorker {
            callable: Some(Box::new(f)),
            on_failure: None,
            started: false,
            flag: None,
            thread: None,
            result: None,
        }
    }

    /// Invoked on the worker thread if the callable fails or panics
    ///
    /// Must be set before `run()`; ignored afterwards.
    pub fn set_failure_callback<G>(&mut self, g: G)
    where
        G: FnOnce() + Send + 'static,
    {
        self.on_failure = Some(Box::new(g));
    }

    /// Spawn the worker thread and wait for its flag handoff
    pub fn run(&mut self) -> TaskResult<()> {
        if self.thread.is_some() {
            return Err(TaskError::AlreadyRunning);
        }
        let f = self.callable.take().ok_or(TaskError::AlreadyRunning)?;
        let on_failure = self.on_failure.take();

        let (result_promise, result_handle) = oneshot::<R>();
        let (flag_promise, flag_handle) = oneshot::<Arc<InterruptFlag>>();

        let handle = thread::Builder::new()
            .name("ith-interruptible".to_string())
            .spawn(move || {
                let flag = Arc::new(InterruptFlag::new());
                flag_promise.complete(Arc::clone(&flag));

                match catch_unwind(AssertUnwindSafe(|| f(&flag))) {
                    Ok(Ok(value)) => result_promise.complete(value),
                    Ok(Err(err)) => {
                        result_promise.fail(err);
                        if let Some(callback) = on_failure {
                            callback();
                        }
                    }
                    Err(payload) => {
                        result_promise.fail(TaskError::Panicked(panic_message(payload)));
                        if let Some(callback) = on_failure {
                            callback();
                        }
                    }
                }
            })
            .map_err(|_| TaskError::SpawnFailed)?;

        self.started = true;
        self.thread = Some(handle);
        self.result = Some(result_handle);

        // The thread completes the flag promise before touching the
        // callable, so this wait is bounded by thread startup.
        let flag = flag_handle.wait()?;
        self.flag = Some(flag);
        Ok(())
    }

    /// Ask the worker to unwind out of its next interruption point
    ///
    /// No effect before `run()` or once the callable has finished.
    pub fn interrupt(&self) {
        if let Some(flag) = &self.flag {
            flag.set();
        }
    }

    /// Has the worker thread finished?
    pub fn is_finished(&self) -> bool {
        self.thread
            .as_ref()
            .map(|t| t.is_finished())
            .unwrap_or(false)
    }

    /// Join the worker thread and re-raise the captured outcome
    pub fn join(&mut self) -> TaskResult<R> {
        if !self.started {
            return Err(TaskError::NotStarted);
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                // The outcome was already captured before anything after
                // the callable could panic; the channel stays
                // authoritative.
                kwarn!("interruptible worker panicked outside the callable");
            }
        }
        self.take_result()
    }

    /// Wait for the captured outcome without joining the thread
    pub fn get(&mut self) -> TaskResult<R> {
        if !self.started {
            return Err(TaskError::NotStarted);
        }
        self.take_result()
    }

    fn take_result(&mut self) -> TaskResult<R> {
        match self.result.take() {
            Some(handle) => handle.wait(),
            None => Err(TaskError::ResultConsumed),
        }
    }
}

impl<R> Drop for InterruptibleWorker<R> {
    fn drop(&mut self) {
        // Same contract as the pool: never leave a detached thread
        // behind. A callable blocked forever must be interrupted first.
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use ithread_core::cancel::interruptible_wait;
    use ithread_core::queue::TwoLockQueue;
    use std::sync::Condvar;

    #[test]
    fn test_run_and_join_value() {
        let mut worker = InterruptibleWorker::new(|_flag| Ok(40 + 2));
        worker.run().unwrap();
        assert_eq!(worker.join().unwrap(), 42);
    }

    #[test]
    fn test_join_before_run_is_usage_error() {
        let mut worker: InterruptibleWorker<()> = InterruptibleWorker::new(|_flag| Ok(()));
        assert_eq!(worker.join(), Err(TaskError::NotStarted));
        assert_eq!(worker.get(), Err(TaskError::NotStarted));
    }

    #[test]
    fn test_second_run_is_usage_error() {
        let mut worker = InterruptibleWorker::new(|_flag| Ok(1));
        worker.run().unwrap();
        assert_eq!(worker.run(), Err(TaskError::AlreadyRunning));
        worker.join().unwrap();
    }

    #[test]
    fn test_interrupt_unblocks_wait() {
        let mut worker: InterruptibleWorker<()> = InterruptibleWorker::new(|flag| {
            let mutex = Mutex::new(());
            let cv = Arc::new(Condvar::new());
            let mut guard = mutex.lock().unwrap();
            // Nothing ever signals this condvar; only interruption can
            // end the wait.
            loop {
                guard = interruptible_wait(flag, &cv, guard)?;
            }
        });
        worker.run().unwrap();

        thread::sleep(Duration::from_millis(20));
        let start = Instant::now();
        worker.interrupt();

        assert_eq!(worker.join(), Err(TaskError::Cancelled));
        assert!(start.elapsed() < Duration::from_millis(200));
    }

    #[test]
    fn test_interrupt_unblocks_queue_pop() {
        let queue: Arc<TwoLockQueue<i32>> = Arc::new(TwoLockQueue::new());
        let consumer_queue = Arc::clone(&queue);

        let mut worker = InterruptibleWorker::new(move |flag| {
            consumer_queue.wait_and_pop_interruptible(flag)
        });
        worker.run().unwrap();

        thread::sleep(Duration::from_millis(20));
        worker.interrupt();

        assert_eq!(worker.join(), Err(TaskError::Cancelled));
    }

    #[test]
    fn test_immediate_interrupt_no_race() {
        // interrupt() directly after run() must hit the live flag
        let mut worker: InterruptibleWorker<()> = InterruptibleWorker::new(|flag| {
            loop {
                flag.check()?;
                thread::sleep(Duration::from_millis(1));
            }
        });
        worker.run().unwrap();
        worker.interrupt();

        assert_eq!(worker.join(), Err(TaskError::Cancelled));
    }

    #[test]
    fn test_failure_callback_on_error() {
        let called = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&called);

        let mut worker: InterruptibleWorker<()> =
            InterruptibleWorker::new(|_flag| Err(TaskError::Cancelled));
        worker.set_failure_callback(move || seen.store(true, Ordering::SeqCst));
        worker.run().unwrap();

        assert_eq!(worker.join(), Err(TaskError::Cancelled));
        assert!(called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_failure_callback_not_called_on_success() {
        let called = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&called);

        let mut worker = InterruptibleWorker::new(|_flag| Ok(5));
        worker.set_failure_callback(move || seen.store(true, Ordering::SeqCst));
        worker.run().unwrap();

        assert_eq!(worker.join().unwrap(), 5);
        assert!(!called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_panicking_callable_captured() {
        let mut worker: InterruptibleWorker<()> =
            InterruptibleWorker::new(|_flag| panic!("wrapper task failed"));
        worker.run().unwrap();

        match worker.join() {
            Err(TaskError::Panicked(msg)) => assert!(msg.contains("wrapper task failed")),
            other => panic!("expected Panicked, got {:?}", other),
        }
    }

    #[test]
    fn test_is_finished() {
        let mut worker = InterruptibleWorker::new(|_flag| Ok(()));
        assert!(!worker.is_finished());
        worker.run().unwrap();
        worker.get().unwrap();

        // The thread may need a moment between completing the promise
        // and exiting
        let deadline = Instant::now() + Duration::from_millis(500);
        while !worker.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(worker.is_finished());
    }

    #[test]
    fn test_result_consumed_after_get() {
        let mut worker = InterruptibleWorker::new(|_flag| Ok(1));
        worker.run().unwrap();
        assert_eq!(worker.get().unwrap(), 1);
        assert_eq!(worker.get(), Err(TaskError::ResultConsumed));
    }
}
