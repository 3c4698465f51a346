//! The [`Task`] trait: an async, cancelable, retry-aware unit of work.
//!
//! A task executes against a client capability `C` — the live RPC handle an
//! instance currently holds. The engine never branches on what a task *is*:
//! it only executes, asks [`Task::should_retry`] on failure, and uses the
//! `Display` label for diagnostics.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// One unit of administrative work executed against a live connection.
///
/// `C` is the opaque client capability the worker snapshots from the
/// instance's connection slot; a task receives its own clone per attempt.
///
/// Implementations must return promptly once `ctx` signals cancellation —
/// typically by `select!`-ing the remote call against `ctx.cancelled()`.
///
/// # Example
/// ```
/// use std::fmt;
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use fleetvisor::{Task, TaskError};
///
/// struct Ping;
///
/// impl fmt::Display for Ping {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         f.write_str("ping")
///     }
/// }
///
/// #[async_trait]
/// impl Task<()> for Ping {
///     async fn execute(&self, ctx: CancellationToken, _client: ()) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::Cancelled);
///         }
///         Ok(())
///     }
///
///     fn should_retry(&self) -> bool {
///         false
///     }
/// }
/// ```
#[async_trait]
pub trait Task<C>: fmt::Display + Send + Sync + 'static
where
    C: Clone + Send + Sync + 'static,
{
    /// Performs one unit of work using the given connection.
    async fn execute(&self, ctx: CancellationToken, client: C) -> Result<(), TaskError>;

    /// Whether the worker should run [`execute`](Task::execute) again after a
    /// failed attempt.
    ///
    /// A pure function of the task's own attempt accounting; a typical policy
    /// caps attempts at a fixed maximum (see
    /// [`RetryBudget`](crate::RetryBudget)). Never consulted after
    /// cancellation.
    fn should_retry(&self) -> bool;
}

/// Shared handle to a task, as stored in an instance's queue.
pub type TaskRef<C> = Arc<dyn Task<C>>;
