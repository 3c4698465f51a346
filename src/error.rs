//! Error types used across the engine.
//!
//! Three families, matching the three fallible surfaces:
//!
//! - [`InstanceError`] — construction/validation failures; fatal, no instance
//!   is created.
//! - [`SubmitError`] — task submission failures; `QueueFull` is transient,
//!   `Closed` is fatal for that instance.
//! - [`TaskError`] — failures raised by a task's own execution; never surfaced
//!   back to the submitter, only to the worker's retry logic.
//!
//! All types provide `as_label()` returning a short stable snake_case label
//! for logs and metrics.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised while constructing or validating an [`Instance`](crate::Instance).
///
/// Both variants mean the named endpoint cannot back an instance right now;
/// construction fails and nothing is created.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum InstanceError {
    /// The registry has no endpoint under this name.
    #[error("no registered endpoint named {name:?}")]
    NotRegistered {
        /// The name that was looked up.
        name: String,
    },

    /// The endpoint exists but its canonical identity does not match the
    /// constraint the caller supplied.
    #[error("endpoint {name:?} has identity {actual}, expected {expected}")]
    IdentityMismatch {
        /// The endpoint name.
        name: String,
        /// The identity the caller required.
        expected: Uuid,
        /// The identity the registry reported.
        actual: Uuid,
    },
}

impl InstanceError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            InstanceError::NotRegistered { .. } => "instance_not_registered",
            InstanceError::IdentityMismatch { .. } => "instance_identity_mismatch",
        }
    }
}

/// Errors raised by [`Instance::submit_task`](crate::Instance::submit_task).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The queue already holds `capacity` pending tasks.
    ///
    /// Transient: the caller may retry once the worker has drained a task, or
    /// drop the submission. Already-queued work is unaffected.
    #[error("task queue is full (capacity {capacity})")]
    QueueFull {
        /// The fixed queue capacity.
        capacity: usize,
    },

    /// The instance has been cleaned up; the queue no longer accepts tasks.
    ///
    /// Fatal for this instance: the caller must stop submitting.
    #[error("task queue is closed")]
    Closed,
}

impl SubmitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SubmitError::QueueFull { .. } => "queue_full",
            SubmitError::Closed => "queue_closed",
        }
    }
}

/// Errors returned by [`Task::execute`](crate::Task::execute).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// The attempt failed; the worker consults the task's retry predicate.
    #[error("execution failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The task observed cancellation and stopped early.
    ///
    /// Never retried, even if the retry predicate would allow it.
    #[error("cancelled")]
    Cancelled,
}

impl TaskError {
    /// Shorthand for a [`TaskError::Failed`] with the given message.
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Failed {
            error: error.into(),
        }
    }

    /// True if this error represents cancellation rather than a real failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TaskError::Cancelled)
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Failed { .. } => "task_failed",
            TaskError::Cancelled => "task_cancelled",
        }
    }
}

/// Error returned by [`Activator::ensure_running`](crate::Activator::ensure_running).
///
/// Activation is best-effort: the worker logs this and proceeds to wait for a
/// connection anyway.
#[derive(Error, Debug)]
#[error("could not wake endpoint {name:?}: {reason}")]
pub struct ActivationError {
    /// The endpoint that failed to wake.
    pub name: String,
    /// A human-readable description of the failure.
    pub reason: String,
}

impl ActivationError {
    /// Creates a new activation error.
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
