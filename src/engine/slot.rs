//! Single-value holder for an instance's live client capability.
//!
//! Writer is the external connection manager (via
//! [`Instance::set_connection`](crate::Instance::set_connection)); reader is
//! the worker. Only the most recently set capability is considered live.
//! Replacing or clearing it has no effect on a call already dispatched
//! against a previous snapshot — that call runs to completion or fails
//! against a now-stale transport.

use std::sync::{PoisonError, RwLock};

/// Thread-safe zero-or-one holder for the current live client.
///
/// All operations are non-blocking and safe for concurrent callers; the slot
/// has no multi-field invariant, so a plain lock around the single value
/// suffices.
pub struct ConnectionSlot<C> {
    current: RwLock<Option<C>>,
}

impl<C: Clone> ConnectionSlot<C> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// Replaces the held capability; `None` clears it.
    pub fn set(&self, client: Option<C>) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = client;
    }

    /// Returns a snapshot of the current capability, if any.
    pub fn client(&self) -> Option<C> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True iff a capability is currently held.
    pub fn is_active(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl<C: Clone> Default for ConnectionSlot<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let slot = ConnectionSlot::<u8>::new();
        assert_eq!(slot.client(), None);
        assert!(!slot.is_active());
    }

    #[test]
    fn set_replace_clear() {
        let slot = ConnectionSlot::new();

        slot.set(Some(1u8));
        assert!(slot.is_active());
        assert_eq!(slot.client(), Some(1));

        slot.set(Some(2));
        assert_eq!(slot.client(), Some(2), "only the newest value is live");

        slot.set(None);
        assert!(!slot.is_active());
        assert_eq!(slot.client(), None);
    }

    #[test]
    fn snapshot_outlives_replacement() {
        let slot = ConnectionSlot::new();
        slot.set(Some("conn-a"));

        let snapshot = slot.client().expect("slot holds a value");
        slot.set(Some("conn-b"));

        // The earlier snapshot is unaffected by the replacement.
        assert_eq!(snapshot, "conn-a");
        assert_eq!(slot.client(), Some("conn-b"));
    }
}
