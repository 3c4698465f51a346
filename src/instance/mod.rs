//! The [`Instance`] aggregate: identity, queue, connection slot, and the
//! worker that ties them together.
//!
//! An instance is created against an [`IdentityRegistry`] that must confirm
//! the named endpoint exists (and, when the caller supplies an identity
//! constraint, that it matches). Identity is immutable after construction.
//! The instance owns exactly one worker, started at construction and halted
//! by [`Instance::cleanup`].

mod properties;

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::Config;
use crate::engine::worker::Worker;
use crate::engine::{ConnectionSlot, TaskQueue};
use crate::error::{InstanceError, SubmitError};
use crate::events::{Bus, Event, EventKind};
use crate::providers::{Activator, IdentityRegistry};
use crate::tasks::TaskRef;

pub use properties::Properties;

/// Optional knobs for [`Instance::new`].
#[derive(Clone, Debug, Default)]
pub struct InstanceOptions {
    /// Identity constraint: construction fails unless the registry reports
    /// exactly this identity for the name.
    pub id: Option<Uuid>,

    /// Parent for the instance's processing context. The instance derives a
    /// child token, so cancelling the parent stops the worker while
    /// [`Instance::cleanup`] never cancels the caller's token.
    pub processing_token: Option<CancellationToken>,
}

/// A managed remote endpoint with its task-processing machinery.
///
/// `C` is the opaque RPC client capability supplied through
/// [`set_connection`](Instance::set_connection) whenever a transport-level
/// connection is established or torn down.
pub struct Instance<C>
where
    C: Clone + Send + Sync + 'static,
{
    name: Arc<str>,
    id: Uuid,
    properties: Properties,

    registry: Arc<dyn IdentityRegistry>,
    queue: TaskQueue<C>,
    slot: Arc<ConnectionSlot<C>>,
    token: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
    bus: Bus,
}

impl<C> Instance<C>
where
    C: Clone + Send + Sync + 'static,
{
    /// Validates identity against the registry and starts the worker.
    ///
    /// Fails with [`InstanceError::NotRegistered`] when the registry has no
    /// endpoint under `name`, and with [`InstanceError::IdentityMismatch`]
    /// when `options.id` is set but differs from the registry's answer. On
    /// failure nothing is created and no worker is spawned.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn new(
        name: impl Into<Arc<str>>,
        properties: Properties,
        options: InstanceOptions,
        registry: Arc<dyn IdentityRegistry>,
        activator: Arc<dyn Activator>,
        config: &Config,
        bus: Bus,
    ) -> Result<Self, InstanceError> {
        let name = name.into();

        let actual = registry
            .identity(&name)
            .await
            .ok_or_else(|| InstanceError::NotRegistered {
                name: name.to_string(),
            })?;
        if let Some(expected) = options.id {
            if expected != actual {
                return Err(InstanceError::IdentityMismatch {
                    name: name.to_string(),
                    expected,
                    actual,
                });
            }
        }

        let (queue, rx) = TaskQueue::new(config.queue_capacity);
        let slot = Arc::new(ConnectionSlot::new());
        let token = options
            .processing_token
            .map(|parent| parent.child_token())
            .unwrap_or_default();

        let worker = Worker::new(
            Arc::clone(&name),
            activator,
            Arc::clone(&slot),
            bus.clone(),
            config.connection_poll,
        );
        let handle = tokio::spawn(worker.run(rx, token.clone()));

        Ok(Self {
            name,
            id: actual,
            properties,
            registry,
            queue,
            slot,
            token,
            worker: Mutex::new(Some(handle)),
            bus,
        })
    }

    /// The stable endpoint name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The canonical identity confirmed at construction.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Descriptive properties captured at construction.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Accepts a task for ordered, eventually-executed processing.
    ///
    /// Fire-and-forget: once accepted, execution errors are governed by the
    /// task's own retry predicate and never surfaced back to the submitter.
    pub fn submit_task(&self, task: TaskRef<C>) -> Result<(), SubmitError> {
        let label: Arc<str> = Arc::from(task.to_string());
        match self.queue.submit(task) {
            Ok(()) => {
                self.publish(Event::now(EventKind::TaskSubmitted).with_task(label));
                Ok(())
            }
            Err(err) => {
                self.publish(
                    Event::now(EventKind::TaskRejected)
                        .with_task(label)
                        .with_error(err.as_label()),
                );
                Err(err)
            }
        }
    }

    /// Replaces the live client capability; `None` clears it.
    ///
    /// Non-blocking and safe for concurrent callers. A call already
    /// dispatched against the previous capability is unaffected.
    pub fn set_connection(&self, client: Option<C>) {
        let kind = match client {
            Some(_) => EventKind::ConnectionReplaced,
            None => EventKind::ConnectionCleared,
        };
        self.slot.set(client);
        self.publish(Event::now(kind));
    }

    /// Snapshot of the current client capability, if any.
    pub fn client(&self) -> Option<C> {
        self.slot.client()
    }

    /// True iff a client capability is currently held.
    pub fn is_active(&self) -> bool {
        self.slot.is_active()
    }

    /// Re-checks liveness: does the registry still report this instance's
    /// identity for its name? Never fails.
    pub async fn is_valid(&self) -> bool {
        self.registry
            .identity(&self.name)
            .await
            .is_some_and(|current| current == self.id)
    }

    /// Stops processing: closes the queue, cancels the processing context,
    /// and joins the worker. Idempotent and safe to call more than once.
    pub async fn cleanup(&self) {
        self.queue.close();
        self.token.cancel();

        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.await;
            self.publish(Event::now(EventKind::InstanceClosed));
        }
    }

    fn publish(&self, ev: Event) {
        self.bus.publish(ev.with_instance(Arc::clone(&self.name)));
    }
}

impl<C> fmt::Debug for Instance<C>
where
    C: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("name", &self.name)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl<C> fmt::Display for Instance<C>
where
    C: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

impl<C> Drop for Instance<C>
where
    C: Clone + Send + Sync + 'static,
{
    // Cleanup without a caller: stop accepting work and halt the worker.
    // The join is skipped; the worker observes the token within one tick.
    fn drop(&mut self) {
        self.queue.close();
        self.token.cancel();
    }
}
