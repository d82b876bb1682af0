//! # ithread - interruptible worker threads
//!
//! Small toolkit of OS-thread concurrency primitives: a two-lock FIFO
//! queue, a fixed worker pool with asynchronous result handles, and
//! cooperative interruption for threads blocked in waits.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ithread::{WorkerPool, InterruptibleWorker};
//!
//! fn main() {
//!     // Pooled lane: submit work, collect results later
//!     let pool = WorkerPool::with_default_size();
//!     let handle = pool.submit(|| 32 + 10).unwrap();
//!     assert_eq!(handle.wait().unwrap(), 42);
//!
//!     // Interruptible lane: one cancellable long-lived task
//!     let mut worker = InterruptibleWorker::new(|flag| {
//!         loop {
//!             flag.check()?;   // interruption point
//!             // ... work ...
//!         }
//!     });
//!     worker.run().unwrap();
//!     worker.interrupt();
//!     assert!(worker.join().is_err()); // Cancelled
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!   caller                              caller
//!     │ submit() ──► TaskHandle           │ run()/interrupt()/join()
//!     ▼                                   ▼
//! ┌─────────────────────────┐      ┌──────────────────────┐
//! │       WorkerPool        │      │  InterruptibleWorker │
//! │  TwoLockQueue<Task>     │      │  dedicated thread    │
//! │  ith-worker-0..N-1      │      │  + InterruptFlag     │
//! └─────────────────────────┘      └──────────────────────┘
//!     │ wait_and_pop                      │ interruptible waits
//!     ▼                                   ▼
//!   Task::run ──► oneshot slot          oneshot slot
//! ```
//!
//! Everything platform-agnostic (queue, task, oneshot, cancel) lives in
//! `ithread-core`; this crate adds the threads and re-exports the core.

pub mod interrupt;
pub mod pool;

pub use interrupt::InterruptibleWorker;
pub use pool::WorkerPool;

// Core re-exports
pub use ithread_core::cancel::{interruptible_wait, InterruptFlag};
pub use ithread_core::constants;
pub use ithread_core::error::{TaskError, TaskResult};
pub use ithread_core::kprint::{set_log_level, LogLevel};
pub use ithread_core::oneshot::{oneshot, Promise, TaskHandle};
pub use ithread_core::queue::TwoLockQueue;
pub use ithread_core::task::Task;

pub use ithread_core::{kdebug, kerror, kinfo, kwarn};
