//! The per-instance processing worker.
//!
//! One worker per instance, bound to a cancelable processing context. It
//! couples "wake the endpoint", "wait for a live connection", "execute", and
//! "retry" into one loop:
//!
//! ```text
//! loop {
//!   ├─► dequeue (or stop on cancellation / closed queue)
//!   ├─► Activator::ensure_running        best-effort, WakeFailed on error
//!   ├─► poll ConnectionSlot every tick   until non-nil, or stop on cancellation
//!   ├─► task.execute(child_token, client snapshot)
//!   │     ├─ Ok            → TaskCompleted, next task
//!   │     ├─ cancelled     → TaskCancelled, stop worker
//!   │     └─ Err
//!   │          ├─ should_retry() → re-snapshot client, execute again
//!   │          └─ else           → TaskAbandoned, next task
//!   └─► repeat
//! }
//! ```
//!
//! ## Rules
//! - Exactly one task executes at a time; retries loop **in place**, never
//!   re-enter the queue, so later submissions cannot jump ahead of a
//!   retrying task.
//! - Cancellation is honoured within one polling tick at every suspension
//!   point, and mid-execute via the child token handed to the task.
//! - A task cancelled mid-execute is discarded without consulting its retry
//!   predicate.
//! - Each attempt executes against a fresh slot snapshot; if the slot was
//!   cleared between attempts the worker goes back to polling.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::engine::slot::ConnectionSlot;
use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};
use crate::providers::Activator;
use crate::tasks::TaskRef;

/// Outcome of processing one dequeued task.
enum Cycle {
    /// Task reached a terminal state; dequeue the next one.
    Next,
    /// The processing context ended; halt the worker.
    Stop,
}

/// Long-lived task-processing loop for one instance.
pub(crate) struct Worker<C> {
    instance: Arc<str>,
    activator: Arc<dyn Activator>,
    slot: Arc<ConnectionSlot<C>>,
    bus: Bus,
    poll: Duration,
}

impl<C> Worker<C>
where
    C: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        instance: Arc<str>,
        activator: Arc<dyn Activator>,
        slot: Arc<ConnectionSlot<C>>,
        bus: Bus,
        poll: Duration,
    ) -> Self {
        Self {
            instance,
            activator,
            slot,
            bus,
            poll,
        }
    }

    /// Runs until the processing context ends or the queue sender is gone.
    pub(crate) async fn run(self, mut rx: mpsc::Receiver<TaskRef<C>>, token: CancellationToken) {
        loop {
            let task = tokio::select! {
                _ = token.cancelled() => break,
                recv = rx.recv() => match recv {
                    Some(task) => task,
                    None => break,
                },
            };

            match self.process(task, &token).await {
                Cycle::Next => continue,
                Cycle::Stop => break,
            }
        }

        self.publish(Event::now(EventKind::WorkerStopped));
    }

    /// Drives one task from dequeue to a terminal state.
    async fn process(&self, task: TaskRef<C>, token: &CancellationToken) -> Cycle {
        let label: Arc<str> = Arc::from(task.to_string());

        // Wake the endpoint so a connection can eventually appear. Failure
        // is logged, not fatal: execution is still gated on the slot.
        if let Err(err) = self.activator.ensure_running(&self.instance).await {
            self.publish(Event::now(EventKind::WakeFailed).with_error(err.to_string()));
        }

        let mut attempt: u32 = 0;
        loop {
            let Some(client) = self.await_connection(&label, token).await else {
                self.publish(Event::now(EventKind::TaskCancelled).with_task(Arc::clone(&label)));
                return Cycle::Stop;
            };

            attempt += 1;
            self.publish(
                Event::now(EventKind::TaskStarting)
                    .with_task(Arc::clone(&label))
                    .with_attempt(attempt),
            );

            let child = token.child_token();
            let result = task.execute(child, client).await;

            // Cancellation mid-execute wins over whatever the task returned:
            // discard without consulting the retry predicate.
            if token.is_cancelled() {
                self.publish(Event::now(EventKind::TaskCancelled).with_task(label));
                return Cycle::Stop;
            }

            match result {
                Ok(()) => {
                    self.publish(
                        Event::now(EventKind::TaskCompleted)
                            .with_task(label)
                            .with_attempt(attempt),
                    );
                    return Cycle::Next;
                }
                Err(TaskError::Cancelled) => {
                    // The task declared it observed cancellation; retrying
                    // would contradict it even though our context is live.
                    self.publish(Event::now(EventKind::TaskCancelled).with_task(label));
                    return Cycle::Next;
                }
                Err(err) => {
                    self.publish(
                        Event::now(EventKind::TaskFailed)
                            .with_task(Arc::clone(&label))
                            .with_attempt(attempt)
                            .with_error(err.to_string()),
                    );
                    if task.should_retry() {
                        continue;
                    }
                    self.publish(
                        Event::now(EventKind::TaskAbandoned)
                            .with_task(label)
                            .with_attempt(attempt),
                    );
                    return Cycle::Next;
                }
            }
        }
    }

    /// Polls the slot at the configured tick until a client appears.
    ///
    /// Returns `None` if the processing context ends first.
    async fn await_connection(&self, label: &Arc<str>, token: &CancellationToken) -> Option<C> {
        if let Some(client) = self.slot.client() {
            return Some(client);
        }

        self.publish(Event::now(EventKind::AwaitingConnection).with_task(Arc::clone(label)));
        loop {
            tokio::select! {
                _ = token.cancelled() => return None,
                _ = time::sleep(self.poll) => {
                    if let Some(client) = self.slot.client() {
                        return Some(client);
                    }
                }
            }
        }
    }

    fn publish(&self, ev: Event) {
        self.bus.publish(ev.with_instance(Arc::clone(&self.instance)));
    }
}
