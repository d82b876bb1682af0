//! Cooperative interruption for blocking threads
//!
//! An `InterruptFlag` belongs to one thread (its owner) and may be set
//! from any other thread. The owner observes it at interruption points -
//! explicit `check()` calls and `interruptible_wait` - and unwinds the
//! current operation by propagating `Err(Cancelled)` with `?` rather
//! than by stack unwinding.
//!
//! While the owner is blocked on a condition variable it registers that
//! condvar with the flag, so `set()` can wake it immediately. The
//! registration is dropped by an RAII guard on every exit path. Waits
//! are additionally bounded to `WAIT_SLICE_MS` slices, so a wakeup lost
//! in the register/wait window delays cancellation by at most one slice.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::constants::WAIT_SLICE_MS;
use crate::error::{TaskError, TaskResult};

/// Per-thread cancellation flag
///
/// Set from any thread, observed and acted upon only by the owner.
pub struct InterruptFlag {
    flag: AtomicBool,
    /// Condvar the owner is currently blocked on, if any
    waiting_on: Mutex<Option<Arc<Condvar>>>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        InterruptFlag {
            flag: AtomicBool::new(false),
            waiting_on: Mutex::new(None),
        }
    }

    /// Request interruption: mark the flag and wake the owner if it is
    /// blocked in an interruptible wait
    pub fn set(&self) {
        self.flag.store(true, Ordering::SeqCst);
        let waiting = self
            .waiting_on
            .lock()
            .expect("interrupt flag mutex poisoned");
        if let Some(cv) = waiting.as_ref() {
            cv.notify_all();
        }
    }

    /// Has interruption been requested?
    #[inline]
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Interruption point: abort the current operation if the flag is set
    ///
    /// ```ignore
    /// fn consume(queue: &TwoLockQueue<Job>, flag: &InterruptFlag) -> TaskResult<()> {
    ///     loop {
    ///         flag.check()?;
    ///         let job = queue.wait_and_pop_interruptible(flag)?;
    ///         // ... run job ...
    ///     }
    /// }
    /// ```
    #[inline]
    pub fn check(&self) -> TaskResult<()> {
        if self.is_set() {
            Err(TaskError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Reset the flag so the owner can be interrupted again
    pub fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    fn register(&self, cv: &Arc<Condvar>) -> Registration<'_> {
        let mut waiting = self
            .waiting_on
            .lock()
            .expect("interrupt flag mutex poisoned");
        *waiting = Some(Arc::clone(cv));
        Registration { flag: self }
    }
}

impl Default for InterruptFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InterruptFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterruptFlag")
            .field("set", &self.is_set())
            .finish()
    }
}

/// Clears the condvar registration when dropped, on every exit path
struct Registration<'a> {
    flag: &'a InterruptFlag,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        let mut waiting = self
            .flag
            .waiting_on
            .lock()
            .expect("interrupt flag mutex poisoned");
        *waiting = None;
    }
}

/// One interruptible wait slice on a condition variable
///
/// Checks the flag, registers the condvar, waits at most `WAIT_SLICE_MS`,
/// deregisters, and checks again. Returns the reacquired guard so the
/// caller can re-evaluate its predicate in a loop; returns
/// `Err(Cancelled)` - releasing the lock - once the flag is set.
pub fn interruptible_wait<'a, T>(
    flag: &InterruptFlag,
    condvar: &Arc<Condvar>,
    guard: MutexGuard<'a, T>,
) -> TaskResult<MutexGuard<'a, T>> {
    flag.check()?;
    let _registered = flag.register(condvar);
    flag.check()?;
    let (guard, _timed_out) = condvar
        .wait_timeout(guard, Duration::from_millis(WAIT_SLICE_MS))
        .expect("interruptible wait mutex poisoned");
    flag.check()?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn test_basic_flag() {
        let flag = InterruptFlag::new();

        assert!(!flag.is_set());
        assert!(flag.check().is_ok());

        flag.set();

        assert!(flag.is_set());
        assert_eq!(flag.check(), Err(TaskError::Cancelled));
    }

    #[test]
    fn test_clear() {
        let flag = InterruptFlag::new();
        flag.set();
        assert!(flag.is_set());

        flag.clear();
        assert!(!flag.is_set());
        assert!(flag.check().is_ok());
    }

    #[test]
    fn test_set_from_other_thread() {
        let flag = Arc::new(InterruptFlag::new());
        let remote = Arc::clone(&flag);

        thread::spawn(move || remote.set()).join().unwrap();
        assert!(flag.is_set());
    }

    #[test]
    fn test_wait_returns_cancelled_when_set() {
        let flag = InterruptFlag::new();
        let cv = Arc::new(Condvar::new());
        let mutex = Mutex::new(());

        flag.set();
        let guard = mutex.lock().unwrap();
        assert!(matches!(
            interruptible_wait(&flag, &cv, guard),
            Err(TaskError::Cancelled)
        ));
    }

    #[test]
    fn test_wait_interrupted_promptly() {
        let flag = Arc::new(InterruptFlag::new());
        let cv = Arc::new(Condvar::new());
        let mutex = Arc::new(Mutex::new(false));

        let waiter = {
            let flag = Arc::clone(&flag);
            let cv = Arc::clone(&cv);
            let mutex = Arc::clone(&mutex);
            thread::spawn(move || -> TaskResult<()> {
                let mut done = mutex.lock().unwrap();
                while !*done {
                    done = interruptible_wait(&flag, &cv, done)?;
                }
                Ok(())
            })
        };

        thread::sleep(Duration::from_millis(20));
        let start = Instant::now();
        flag.set();

        let outcome = waiter.join().unwrap();
        assert_eq!(outcome, Err(TaskError::Cancelled));
        // Bounded by the wait slice, with generous margin for CI
        assert!(start.elapsed() < Duration::from_millis(200));
    }

    #[test]
    fn test_registration_cleared_after_wait() {
        let flag = InterruptFlag::new();
        let cv = Arc::new(Condvar::new());
        let mutex = Mutex::new(());

        let guard = mutex.lock().unwrap();
        let guard = interruptible_wait(&flag, &cv, guard).unwrap();
        drop(guard);

        assert!(flag.waiting_on.lock().unwrap().is_none());
    }
}
