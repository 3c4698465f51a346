//! Engine configuration.
//!
//! [`Config`] bounds the per-instance backlog, sets the connection polling
//! tick, and sizes the event bus.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use fleetvisor::Config;
//!
//! let mut cfg = Config::default();
//! cfg.queue_capacity = 4;
//! cfg.connection_poll = Duration::from_millis(250);
//!
//! assert_eq!(cfg.queue_capacity, 4);
//! ```

use std::time::Duration;

/// Configuration shared by every instance an engine creates.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of pending tasks per instance.
    ///
    /// A small constant: the queue bounds backlog, it does not buffer
    /// indefinitely. Submissions beyond this fail with
    /// [`SubmitError::QueueFull`](crate::SubmitError::QueueFull).
    pub queue_capacity: usize,

    /// Interval at which the worker re-reads the connection slot while
    /// waiting for a live client.
    pub connection_poll: Duration,

    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `queue_capacity = 10`
    /// - `connection_poll = 1s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            queue_capacity: 10,
            connection_poll: Duration::from_secs(1),
            bus_capacity: 1024,
        }
    }
}
