//! Task abstraction, retry accounting, and the shipped provisioning tasks.

mod provision;
mod retry;
mod task;
mod task_fn;

pub use provision::{ApplyProToken, ConfigureLandscape, GuestService, PROVISION_MAX_ATTEMPTS};
pub use retry::RetryBudget;
pub use task::{Task, TaskRef};
pub use task_fn::TaskFn;
