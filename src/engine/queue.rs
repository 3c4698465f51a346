//! Bounded FIFO of pending tasks for one instance.
//!
//! A thin wrapper over a bounded [`tokio::sync::mpsc`] channel plus a
//! permanent closed flag. The worker holds the receiving half; the queue only
//! exposes non-blocking submission.
//!
//! ## Rules
//! - `submit` fails with [`SubmitError::QueueFull`] once `capacity` tasks are
//!   pending, and with [`SubmitError::Closed`] after `close()`.
//! - FIFO order is preserved among tasks accepted while open.
//! - `close()` is permanent and idempotent; tasks already accepted still
//!   drain (or are discarded with the worker on cancellation).

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use crate::error::SubmitError;
use crate::tasks::TaskRef;

/// Bounded FIFO of pending tasks.
pub struct TaskQueue<C>
where
    C: Clone + Send + Sync + 'static,
{
    tx: mpsc::Sender<TaskRef<C>>,
    closed: AtomicBool,
    capacity: usize,
}

impl<C> TaskQueue<C>
where
    C: Clone + Send + Sync + 'static,
{
    /// Creates an empty queue and the receiver its worker will drain.
    pub(crate) fn new(capacity: usize) -> (Self, mpsc::Receiver<TaskRef<C>>) {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                tx,
                closed: AtomicBool::new(false),
                capacity,
            },
            rx,
        )
    }

    /// Accepts a task for eventual execution, without blocking.
    pub fn submit(&self, task: TaskRef<C>) -> Result<(), SubmitError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SubmitError::Closed);
        }
        self.tx.try_send(task).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SubmitError::QueueFull {
                capacity: self.capacity,
            },
            mpsc::error::TrySendError::Closed(_) => SubmitError::Closed,
        })
    }

    /// Permanently refuses further submissions. Idempotent.
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// True once the queue has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// The fixed capacity this queue was created with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
