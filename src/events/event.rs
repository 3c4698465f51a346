//! Runtime events emitted by instances and their workers.
//!
//! [`EventKind`] classifies what happened; [`Event`] carries the metadata:
//! which instance, which task, which attempt, and an error message where one
//! applies.
//!
//! ## Ordering
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! observed out of order.
//!
//! ## Example
//! ```rust
//! use fleetvisor::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::TaskFailed)
//!     .with_instance("vm-1")
//!     .with_task("apply-pro-token")
//!     .with_attempt(3)
//!     .with_error("connection reset");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.instance.as_deref(), Some("vm-1"));
//! assert_eq!(ev.attempt, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Connection slot ===
    /// A live client capability was placed in the slot.
    ///
    /// Sets: `instance`, `at`, `seq`.
    ConnectionReplaced,

    /// The slot was cleared; the instance has no live client.
    ///
    /// Sets: `instance`, `at`, `seq`.
    ConnectionCleared,

    // === Worker progress ===
    /// Best-effort endpoint wake failed. Non-fatal: execution is still gated
    /// on a live connection appearing in the slot.
    ///
    /// Sets: `instance`, `error`, `at`, `seq`.
    WakeFailed,

    /// The worker dequeued a task and is polling for a live connection.
    ///
    /// Sets: `instance`, `task`, `at`, `seq`.
    AwaitingConnection,

    /// The worker loop halted permanently (processing context ended or the
    /// queue was closed and drained).
    ///
    /// Sets: `instance`, `at`, `seq`.
    WorkerStopped,

    // === Task lifecycle ===
    /// A task was accepted into the queue.
    ///
    /// Sets: `instance`, `task`, `at`, `seq`.
    TaskSubmitted,

    /// A submission was refused (queue full or closed).
    ///
    /// Sets: `instance`, `task`, `error`, `at`, `seq`.
    TaskRejected,

    /// An execution attempt is starting.
    ///
    /// Sets: `instance`, `task`, `attempt` (1-based), `at`, `seq`.
    TaskStarting,

    /// The task completed successfully and was discarded.
    ///
    /// Sets: `instance`, `task`, `attempt`, `at`, `seq`.
    TaskCompleted,

    /// An attempt failed. Followed by another `TaskStarting` if the task's
    /// retry predicate allows, otherwise by `TaskAbandoned`.
    ///
    /// Sets: `instance`, `task`, `attempt`, `error`, `at`, `seq`.
    TaskFailed,

    /// The task exhausted its retry predicate and was discarded.
    ///
    /// Sets: `instance`, `task`, `attempt`, `at`, `seq`.
    TaskAbandoned,

    /// The task was cancelled by the processing context and discarded without
    /// consulting its retry predicate.
    ///
    /// Sets: `instance`, `task`, `at`, `seq`.
    TaskCancelled,

    // === Instance lifecycle ===
    /// Cleanup finished: queue closed, worker joined.
    ///
    /// Sets: `instance`, `at`, `seq`.
    InstanceClosed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the instance, if applicable.
    pub instance: Option<Arc<str>>,
    /// Label of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Human-readable error message.
    pub error: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            instance: None,
            task: None,
            attempt: None,
            error: None,
        }
    }

    /// Attaches an instance name.
    #[inline]
    pub fn with_instance(mut self, instance: impl Into<Arc<str>>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Attaches a task label.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a human-readable error message.
    #[inline]
    pub fn with_error(mut self, error: impl Into<Arc<str>>) -> Self {
        self.error = Some(error.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::now(EventKind::TaskStarting);
        let b = Event::now(EventKind::TaskStarting);
        assert!(b.seq > a.seq, "seq should increase: {} then {}", a.seq, b.seq);
    }

    #[test]
    fn builders_set_fields() {
        let ev = Event::now(EventKind::TaskFailed)
            .with_instance("vm-1")
            .with_task("t")
            .with_attempt(2)
            .with_error("boom");
        assert_eq!(ev.instance.as_deref(), Some("vm-1"));
        assert_eq!(ev.task.as_deref(), Some("t"));
        assert_eq!(ev.attempt, Some(2));
        assert_eq!(ev.error.as_deref(), Some("boom"));
    }
}
