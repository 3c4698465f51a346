//! The per-instance processing engine: queue, connection slot, and worker.

mod queue;
mod slot;
pub(crate) mod worker;

pub use queue::TaskQueue;
pub use slot::ConnectionSlot;
