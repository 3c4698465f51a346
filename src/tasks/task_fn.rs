//! Function-backed task (`TaskFn`).
//!
//! [`TaskFn`] wraps a closure `F: Fn(CancellationToken, C) -> Fut`, producing
//! a fresh future per attempt. State shared across attempts belongs in an
//! `Arc<...>` captured by the closure.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::retry::RetryBudget;
use crate::tasks::task::Task;

/// Function-backed task implementation.
///
/// One-shot by default; [`TaskFn::with_retries`] attaches an attempt budget.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use fleetvisor::{TaskError, TaskFn, TaskRef};
///
/// let t: TaskRef<()> = TaskFn::arc("noop", |_ctx: CancellationToken, _client: ()| async {
///     Ok::<_, TaskError>(())
/// });
/// assert_eq!(t.to_string(), "noop");
/// ```
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    budget: Option<RetryBudget>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            budget: None,
            f,
        }
    }

    /// Allows up to `max_attempts` executions before the task is abandoned.
    pub fn with_retries(mut self, max_attempts: u32) -> Self {
        self.budget = Some(RetryBudget::new(max_attempts));
        self
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> fmt::Display for TaskFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[async_trait]
impl<C, F, Fut> Task<C> for TaskFn<F>
where
    C: Clone + Send + Sync + 'static,
    F: Fn(CancellationToken, C) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    async fn execute(&self, ctx: CancellationToken, client: C) -> Result<(), TaskError> {
        if let Some(budget) = &self.budget {
            budget.record_attempt();
        }
        (self.f)(ctx, client).await
    }

    fn should_retry(&self) -> bool {
        self.budget.as_ref().is_some_and(|b| !b.exhausted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn one_shot_by_default() {
        let t = TaskFn::new("once", |_ctx, _client: ()| async {
            Ok::<_, TaskError>(())
        });
        let _ = t.execute(CancellationToken::new(), ()).await;
        assert!(!Task::<()>::should_retry(&t));
    }

    #[tokio::test]
    async fn retry_budget_is_consumed_by_attempts() {
        let t = TaskFn::new("flaky", |_ctx, _client: ()| async {
            Err::<(), _>(TaskError::fail("nope"))
        })
        .with_retries(2);

        let _ = t.execute(CancellationToken::new(), ()).await;
        assert!(Task::<()>::should_retry(&t), "one attempt of two used");
        let _ = t.execute(CancellationToken::new(), ()).await;
        assert!(!Task::<()>::should_retry(&t), "budget exhausted");
    }
}
