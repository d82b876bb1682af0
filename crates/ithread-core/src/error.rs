//! Error types for the ithread primitives

use core::fmt;

/// Result type for queue, task and worker operations
pub type TaskResult<T> = Result<T, TaskError>;

/// Errors that can occur in queue, pool and worker operations
///
/// Usage errors (`PoolStopped`, `AlreadyRunning`, `NotStarted`,
/// `ResultConsumed`) are fatal to the call, never to the process.
/// `Panicked` and `Cancelled` are scoped to one task: they travel through
/// that task's result handle and leave every other task untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Operation was cancelled via an InterruptFlag
    Cancelled,

    /// Task callable panicked while executing
    Panicked(String),

    /// Submission after pool shutdown began
    PoolStopped,

    /// Queue was closed and has been drained
    QueueClosed,

    /// Result was never written (promise dropped before completing)
    ResultDropped,

    /// Result was already retrieved
    ResultConsumed,

    /// Worker is already running
    AlreadyRunning,

    /// Worker was never started
    NotStarted,

    /// Failed to spawn the OS thread
    SpawnFailed,
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::Cancelled => write!(f, "operation cancelled"),
            TaskError::Panicked(msg) => write!(f, "task panicked: {}", msg),
            TaskError::PoolStopped => write!(f, "submit on stopped pool"),
            TaskError::QueueClosed => write!(f, "queue closed"),
            TaskError::ResultDropped => write!(f, "result was never written"),
            TaskError::ResultConsumed => write!(f, "result already retrieved"),
            TaskError::AlreadyRunning => write!(f, "worker already running"),
            TaskError::NotStarted => write!(f, "worker not started"),
            TaskError::SpawnFailed => write!(f, "failed to spawn thread"),
        }
    }
}

impl std::error::Error for TaskError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = TaskError::Cancelled;
        assert_eq!(format!("{}", e), "operation cancelled");

        let e = TaskError::Panicked("boom".to_string());
        assert_eq!(format!("{}", e), "task panicked: boom");

        let e = TaskError::PoolStopped;
        assert_eq!(format!("{}", e), "submit on stopped pool");
    }

    #[test]
    fn test_error_is_std_error() {
        fn assert_error<E: std::error::Error>(_e: &E) {}
        assert_error(&TaskError::QueueClosed);
    }
}
