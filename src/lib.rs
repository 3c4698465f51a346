//! # fleetvisor
//!
//! **Fleetvisor** is a per-instance task-processing engine for control-plane
//! agents that manage a fleet of remote managed endpoints (virtual guest
//! instances). Administrative commands are dispatched to each endpoint over
//! an RPC connection that may not exist yet, retried per-task, and executed
//! in order with cooperative cancellation.
//!
//! ## Architecture
//! ```text
//!   submitter                connection manager
//!      │ submit_task(task)        │ set_connection(client | None)
//!      ▼                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │  Instance "vm-1"                                        │
//! │  ┌────────────┐      ┌────────────────┐                 │
//! │  │ TaskQueue  │      │ ConnectionSlot │                 │
//! │  │ (bounded   │      │ (0..1 live     │                 │
//! │  │  FIFO)     │      │  client)       │                 │
//! │  └─────┬──────┘      └───────┬────────┘                 │
//! │        │ dequeue             │ snapshot per attempt     │
//! │        ▼                     ▼                          │
//! │  ┌─────────────────────────────────────┐                │
//! │  │ Worker (one per instance)           │                │
//! │  │   wake endpoint (best effort)       │──► Activator   │
//! │  │   poll slot until live / cancelled  │                │
//! │  │   execute(child_token, client)      │                │
//! │  │   retry in place per the task       │                │
//! │  └─────────────────┬───────────────────┘                │
//! └────────────────────┼────────────────────────────────────┘
//!                      │ publishes Events
//!                      ▼
//!            Bus ──► SubscriberSet ──► LogWriter / custom sinks
//! ```
//!
//! Many instances run fully independent workers concurrently; a [`Fleet`]
//! owns the collection, fans configuration tasks out, and routes accepted
//! connections to the right slot. Exactly one task executes at a time per
//! instance, and a retrying task is never overtaken by later submissions.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use fleetvisor::{
//!     Activator, ActivationError, Bus, Config, Fleet, IdentityRegistry, LogWriter, Properties,
//!     Subscribe, SubscriberSet, TaskError, TaskFn,
//! };
//! use async_trait::async_trait;
//! use uuid::Uuid;
//!
//! struct Hypervisor;
//!
//! #[async_trait]
//! impl IdentityRegistry for Hypervisor {
//!     async fn identity(&self, _name: &str) -> Option<Uuid> { Some(Uuid::new_v4()) }
//! }
//!
//! #[async_trait]
//! impl Activator for Hypervisor {
//!     async fn ensure_running(&self, _name: &str) -> Result<(), ActivationError> { Ok(()) }
//! }
//!
//! # #[derive(Clone)] struct RpcClient;
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = Bus::new(Config::default().bus_capacity);
//!     let subs = Arc::new(SubscriberSet::new(vec![Arc::new(LogWriter) as Arc<dyn Subscribe>]));
//!     Arc::clone(&subs).attach(&bus);
//!
//!     let hv = Arc::new(Hypervisor);
//!     let fleet: Fleet<RpcClient> = Fleet::new(Config::default(), hv.clone(), hv, bus);
//!
//!     let vm = fleet.get_or_create("vm-1", Properties::default()).await?;
//!     vm.submit_task(TaskFn::arc("ping", |_ctx, _client: RpcClient| async {
//!         Ok::<_, TaskError>(())
//!     }))?;
//!
//!     // Later, when the transport hands over a live connection:
//!     // fleet.route_connection("vm-1", Some(client)).await;
//!
//!     fleet.cleanup_all().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod fleet;
pub mod instance;
pub mod providers;
pub mod subscribers;
pub mod tasks;

pub use config::Config;
pub use engine::{ConnectionSlot, TaskQueue};
pub use error::{ActivationError, InstanceError, SubmitError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use fleet::Fleet;
pub use instance::{Instance, InstanceOptions, Properties};
pub use providers::{Activator, IdentityRegistry};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use tasks::{
    ApplyProToken, ConfigureLandscape, GuestService, RetryBudget, Task, TaskFn, TaskRef,
    PROVISION_MAX_ATTEMPTS,
};

#[cfg(test)]
pub(crate) mod testutil;
