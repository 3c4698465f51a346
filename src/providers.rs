//! Boundary traits for the external collaborators the engine consumes.
//!
//! The engine never starts, stops, or enumerates endpoints itself; it asks an
//! [`Activator`] to wake them and an [`IdentityRegistry`] to confirm they
//! exist. Both are supplied by the embedding agent.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ActivationError;

/// Name → canonical identity lookup.
///
/// Consulted once at instance construction and by
/// [`Instance::is_valid`](crate::Instance::is_valid) at any later time.
#[async_trait]
pub trait IdentityRegistry: Send + Sync + 'static {
    /// Returns the canonical identity for `name`, or `None` if no such
    /// endpoint is registered.
    async fn identity(&self, name: &str) -> Option<Uuid>;
}

/// Best-effort "make sure this endpoint is running".
///
/// May be slow. Failure is non-fatal to the worker cycle that called it:
/// execution is gated on a live connection appearing in the slot, not on
/// activation succeeding.
#[async_trait]
pub trait Activator: Send + Sync + 'static {
    /// Ensures the named endpoint is running, starting it if needed.
    async fn ensure_running(&self, name: &str) -> Result<(), ActivationError>;
}
