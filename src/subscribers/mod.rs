//! Event subscribers: the trait, the fan-out set, and a stdout sink.

mod log;
mod set;
mod subscriber;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
