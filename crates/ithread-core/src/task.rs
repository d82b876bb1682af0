//! Type-erased unit of work
//!
//! A `Task` captures an arbitrary callable and its environment into one
//! niladic, move-only value the queue can carry between threads. Binding
//! pairs the callable with a fresh result channel; the original return
//! type flows into the caller's `TaskHandle` while the queue only ever
//! sees `Task`.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::TaskError;
use crate::oneshot::{oneshot, TaskHandle};

/// One queued unit of work
///
/// Move-only: at most one owner exists at any time, so the queue can
/// hand it from producer to consumer without synchronizing the payload.
/// `run` consumes the task, making a second invocation a compile error.
pub struct Task {
    f: Box<dyn FnOnce() + Send + 'static>,
}

impl Task {
    /// Bind a callable to a fresh result channel
    ///
    /// The returned task runs the callable under `catch_unwind`: a value
    /// completes the handle, a panic is captured into it as
    /// `TaskError::Panicked`. Failures never unwind into the thread that
    /// eventually calls `run` - a pool worker survives any task.
    pub fn bind<F, R>(f: F) -> (Task, TaskHandle<R>)
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (promise, handle) = oneshot();
        let task = Task {
            f: Box::new(move || match catch_unwind(AssertUnwindSafe(f)) {
                Ok(value) => promise.complete(value),
                Err(payload) => promise.fail(TaskError::Panicked(panic_message(payload))),
            }),
        };
        (task, handle)
    }

    /// Execute the unit of work exactly once
    pub fn run(self) {
        (self.f)();
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Task")
    }
}

/// Extract a printable message from a panic payload
pub fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
