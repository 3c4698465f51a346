//! The [`Subscribe`] trait: an async consumer of runtime [`Event`]s.

use async_trait::async_trait;

use crate::events::Event;

/// An async consumer of runtime events.
///
/// Implementations receive events through a bounded per-subscriber queue (see
/// [`SubscriberSet`](crate::SubscriberSet)): a slow subscriber drops its own
/// events without stalling workers or other subscribers.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use fleetvisor::{Event, Subscribe};
///
/// struct Counter;
///
/// #[async_trait]
/// impl Subscribe for Counter {
///     fn name(&self) -> &'static str { "counter" }
///     async fn on_event(&self, _ev: &Event) { /* count something */ }
/// }
/// ```
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Stable subscriber name, used when reporting drops and panics.
    fn name(&self) -> &'static str;

    /// Capacity of this subscriber's event queue.
    fn queue_capacity(&self) -> usize {
        256
    }

    /// Handles one event.
    async fn on_event(&self, event: &Event);
}
