//! # ithread-core
//!
//! Core primitives for the ithread toolkit. Platform-agnostic, std-only;
//! everything that spawns OS threads lives in the `ithread` crate on top.
//!
//! ## Modules
//!
//! - `queue` - two-lock FIFO queue with a permanent sentinel node
//! - `task` - type-erased, move-only unit of work
//! - `oneshot` - single-write/single-read result channel
//! - `cancel` - interrupt flag and interruptible condvar waits
//! - `error` - error types
//! - `env` - environment variable utilities
//! - `kprint` - kernel-style debug printing macros

pub mod cancel;
pub mod env;
pub mod error;
pub mod kprint;
pub mod oneshot;
pub mod queue;
pub mod task;

// Re-exports for convenience
pub use cancel::{interruptible_wait, InterruptFlag};
pub use error::{TaskError, TaskResult};
pub use kprint::{set_log_level, LogLevel};
pub use oneshot::{oneshot, Promise, TaskHandle};
pub use queue::TwoLockQueue;
pub use task::Task;

/// Tuning constants
pub mod constants {
    /// Granularity of interruptible waits, in milliseconds
    ///
    /// A wakeup lost between condvar registration and the wait itself
    /// delays cancellation by at most this long.
    pub const WAIT_SLICE_MS: u64 = 1;

    /// Upper bound on pool worker threads
    pub const MAX_WORKERS: usize = 64;
}
