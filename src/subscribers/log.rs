//! Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [submitted] instance=vm-1 task=apply-pro-token
//! [awaiting-connection] instance=vm-1
//! [starting] instance=vm-1 task=apply-pro-token attempt=1
//! [failed] instance=vm-1 task=apply-pro-token attempt=1 err="connection reset"
//! [abandoned] instance=vm-1 task=apply-pro-token attempt=5
//! [cancelled] instance=vm-1 task=apply-pro-token
//! [worker-stopped] instance=vm-1
//! ```
//!
//! Not intended for production use — implement a custom
//! [`Subscribe`](crate::Subscribe) for structured logging or metrics.

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Simple stdout logging subscriber.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    fn name(&self) -> &'static str {
        "log-writer"
    }

    async fn on_event(&self, e: &Event) {
        let instance = e.instance.as_deref().unwrap_or("?");
        match e.kind {
            EventKind::ConnectionReplaced => {
                println!("[connection-replaced] instance={instance}");
            }
            EventKind::ConnectionCleared => {
                println!("[connection-cleared] instance={instance}");
            }
            EventKind::WakeFailed => {
                println!(
                    "[wake-failed] instance={instance} err={:?}",
                    e.error.as_deref().unwrap_or("")
                );
            }
            EventKind::AwaitingConnection => {
                println!("[awaiting-connection] instance={instance}");
            }
            EventKind::WorkerStopped => {
                println!("[worker-stopped] instance={instance}");
            }
            EventKind::TaskSubmitted => {
                println!(
                    "[submitted] instance={instance} task={:?}",
                    e.task.as_deref().unwrap_or("")
                );
            }
            EventKind::TaskRejected => {
                println!(
                    "[rejected] instance={instance} task={:?} err={:?}",
                    e.task.as_deref().unwrap_or(""),
                    e.error.as_deref().unwrap_or("")
                );
            }
            EventKind::TaskStarting => {
                println!(
                    "[starting] instance={instance} task={:?} attempt={}",
                    e.task.as_deref().unwrap_or(""),
                    e.attempt.unwrap_or(0)
                );
            }
            EventKind::TaskCompleted => {
                println!(
                    "[completed] instance={instance} task={:?} attempt={}",
                    e.task.as_deref().unwrap_or(""),
                    e.attempt.unwrap_or(0)
                );
            }
            EventKind::TaskFailed => {
                println!(
                    "[failed] instance={instance} task={:?} attempt={} err={:?}",
                    e.task.as_deref().unwrap_or(""),
                    e.attempt.unwrap_or(0),
                    e.error.as_deref().unwrap_or("")
                );
            }
            EventKind::TaskAbandoned => {
                println!(
                    "[abandoned] instance={instance} task={:?} attempt={}",
                    e.task.as_deref().unwrap_or(""),
                    e.attempt.unwrap_or(0)
                );
            }
            EventKind::TaskCancelled => {
                println!(
                    "[cancelled] instance={instance} task={:?}",
                    e.task.as_deref().unwrap_or("")
                );
            }
            EventKind::InstanceClosed => {
                println!("[instance-closed] instance={instance}");
            }
        }
    }
}
