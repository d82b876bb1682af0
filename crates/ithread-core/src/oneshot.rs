//! Single-write, single-read result channel
//!
//! Backs every submitted task and every interruptible worker: the
//! executing side holds the `Promise`, the caller holds the `TaskHandle`.
//! The slot is written at most once, either with a value or with a
//! failure, and read exactly once.
//!
//! Misuse fails loudly instead of silently:
//! - a second write is unrepresentable (`complete`/`fail` consume the
//!   `Promise`) and an internal double-fill panics,
//! - a second read is unrepresentable (`wait` consumes the handle),
//! - a `Promise` dropped before writing stores `Err(ResultDropped)` so
//!   the reader unblocks with an error instead of hanging forever.

use std::sync::{Arc, Condvar, Mutex};

use crate::error::{TaskError, TaskResult};

/// Create a connected promise/handle pair with an empty slot
pub fn oneshot<T>() -> (Promise<T>, TaskHandle<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(None),
        ready: Condvar::new(),
    });
    (
        Promise {
            shared: Arc::clone(&shared),
            fulfilled: false,
        },
        TaskHandle { shared },
    )
}

struct Shared<T> {
    /// None until the writer delivers exactly one outcome
    slot: Mutex<Option<TaskResult<T>>>,
    ready: Condvar,
}

/// Writing half: delivers one value or one failure
pub struct Promise<T> {
    shared: Arc<Shared<T>>,
    fulfilled: bool,
}

/// Reading half: blocks until the outcome is delivered
pub struct TaskHandle<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Promise<T> {
    /// Deliver the value and wake the reader
    pub fn complete(self, value: T) {
        self.fill(Ok(value));
    }

    /// Deliver a failure and wake the reader
    pub fn fail(self, err: TaskError) {
        self.fill(Err(err));
    }

    fn fill(mut self, outcome: TaskResult<T>) {
        {
            let mut slot = self
                .shared
                .slot
                .lock()
                .expect("result channel mutex poisoned");
            if slot.is_some() {
                panic!("result channel written twice");
            }
            *slot = Some(outcome);
        }
        self.fulfilled = true;
        self.shared.ready.notify_all();
    }
}

impl<T> Drop for Promise<T> {
    fn drop(&mut self) {
        if self.fulfilled {
            return;
        }
        // Writer going away without an outcome: unblock the reader.
        let mut slot = self
            .shared
            .slot
            .lock()
            .expect("result channel mutex poisoned");
        if slot.is_none() {
            *slot = Some(Err(TaskError::ResultDropped));
        }
        drop(slot);
        self.shared.ready.notify_all();
    }
}

impl<T> TaskHandle<T> {
    /// Block until the outcome is delivered, then return it
    ///
    /// Consumes the handle, so a result can only be retrieved once.
    pub fn wait(self) -> TaskResult<T> {
        let mut slot = self
            .shared
            .slot
            .lock()
            .expect("result channel mutex poisoned");
        loop {
            if let Some(outcome) = slot.take() {
                return outcome;
            }
            slot = self
                .shared
                .ready
                .wait(slot)
                .expect("result channel mutex poisoned");
        }
    }

    /// Non-blocking probe: has the outcome been delivered yet?
    pub fn is_ready(&self) -> bool {
        self.shared
            .slot
            .lock()
            .expect("result channel mutex poisoned")
            .is_some()
    }
}

impl<T> std::fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("ready", &self.is_ready())
            .finish()
    }
}
