//! Shipped provisioning tasks and the service surface they call.
//!
//! The fleet owner fans two kinds of configuration work out to every
//! instance: applying a Pro subscription token and applying a remote
//! management (Landscape) configuration. Both are written against the
//! [`GuestService`] boundary trait rather than a concrete transport, and both
//! cap execution at [`PROVISION_MAX_ATTEMPTS`] attempts.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::retry::RetryBudget;
use crate::tasks::task::Task;

/// Maximum execution attempts for a provisioning task.
pub const PROVISION_MAX_ATTEMPTS: u32 = 5;

/// The remote calls provisioning tasks need from a client capability.
///
/// Implemented by the transport layer over whatever RPC stack carries the
/// connection; the engine itself stays generic over `C`.
#[async_trait]
pub trait GuestService: Send + Sync + 'static {
    /// Applies (or clears, when empty) the Pro subscription token.
    async fn apply_pro_token(&self, token: &str) -> Result<(), TaskError>;

    /// Applies the remote-management client configuration.
    async fn apply_landscape_config(&self, config: &str) -> Result<(), TaskError>;
}

#[async_trait]
impl<T> GuestService for Arc<T>
where
    T: GuestService + ?Sized,
{
    async fn apply_pro_token(&self, token: &str) -> Result<(), TaskError> {
        (**self).apply_pro_token(token).await
    }

    async fn apply_landscape_config(&self, config: &str) -> Result<(), TaskError> {
        (**self).apply_landscape_config(config).await
    }
}

/// Applies a Pro subscription token to one instance.
pub struct ApplyProToken {
    token: String,
    budget: RetryBudget,
}

impl ApplyProToken {
    /// Creates the task. An empty token means "detach".
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            budget: RetryBudget::new(PROVISION_MAX_ATTEMPTS),
        }
    }
}

impl fmt::Display for ApplyProToken {
    // The token is a credential; the label never includes it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("apply-pro-token")
    }
}

#[async_trait]
impl<C> Task<C> for ApplyProToken
where
    C: GuestService + Clone + Send + Sync + 'static,
{
    async fn execute(&self, ctx: CancellationToken, client: C) -> Result<(), TaskError> {
        self.budget.record_attempt();
        tokio::select! {
            res = client.apply_pro_token(&self.token) => res,
            _ = ctx.cancelled() => Err(TaskError::Cancelled),
        }
    }

    fn should_retry(&self) -> bool {
        !self.budget.exhausted()
    }
}

/// Applies a Landscape client configuration to one instance.
pub struct ConfigureLandscape {
    config: String,
    budget: RetryBudget,
}

impl ConfigureLandscape {
    /// Creates the task. An empty config means "deregister".
    pub fn new(config: impl Into<String>) -> Self {
        Self {
            config: config.into(),
            budget: RetryBudget::new(PROVISION_MAX_ATTEMPTS),
        }
    }
}

impl fmt::Display for ConfigureLandscape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("configure-landscape")
    }
}

#[async_trait]
impl<C> Task<C> for ConfigureLandscape
where
    C: GuestService + Clone + Send + Sync + 'static,
{
    async fn execute(&self, ctx: CancellationToken, client: C) -> Result<(), TaskError> {
        self.budget.record_attempt();
        tokio::select! {
            res = client.apply_landscape_config(&self.config) => res,
            _ = ctx.cancelled() => Err(TaskError::Cancelled),
        }
    }

    fn should_retry(&self) -> bool {
        !self.budget.exhausted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct FakeService {
        tokens: Arc<Mutex<Vec<String>>>,
        configs: Arc<Mutex<Vec<String>>>,
        fail: bool,
        hang: bool,
    }

    #[async_trait]
    impl GuestService for FakeService {
        async fn apply_pro_token(&self, token: &str) -> Result<(), TaskError> {
            if self.hang {
                std::future::pending::<()>().await;
            }
            self.tokens.lock().unwrap().push(token.to_string());
            if self.fail {
                return Err(TaskError::fail("pro attach refused"));
            }
            Ok(())
        }

        async fn apply_landscape_config(&self, config: &str) -> Result<(), TaskError> {
            self.configs.lock().unwrap().push(config.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn apply_pro_token_calls_service() {
        let service = FakeService::default();
        let task = ApplyProToken::new("tok-123");

        task.execute(CancellationToken::new(), service.clone())
            .await
            .expect("apply should succeed");

        assert_eq!(*service.tokens.lock().unwrap(), vec!["tok-123"]);
        assert_eq!(task.to_string(), "apply-pro-token");
    }

    #[tokio::test]
    async fn retry_predicate_caps_at_five_attempts() {
        let service = FakeService {
            fail: true,
            ..Default::default()
        };
        let task = ApplyProToken::new("tok");

        for attempt in 1..=PROVISION_MAX_ATTEMPTS {
            let res = task.execute(CancellationToken::new(), service.clone()).await;
            assert!(res.is_err(), "attempt {attempt} should fail");
            if attempt < PROVISION_MAX_ATTEMPTS {
                assert!(Task::<FakeService>::should_retry(&task));
            }
        }
        assert!(!Task::<FakeService>::should_retry(&task));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_a_hung_call() {
        let service = FakeService {
            hang: true,
            ..Default::default()
        };
        let task = ApplyProToken::new("tok");
        let ctx = CancellationToken::new();

        let exec = tokio::spawn({
            let ctx = ctx.clone();
            async move { task.execute(ctx, service).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        ctx.cancel();

        let res = exec.await.expect("execute should not panic");
        assert!(matches!(res, Err(TaskError::Cancelled)));
    }

    #[tokio::test]
    async fn configure_landscape_calls_service() {
        let service = FakeService::default();
        let task = ConfigureLandscape::new("[client]\nurl = landscape.example.com");

        task.execute(CancellationToken::new(), service.clone())
            .await
            .expect("configure should succeed");

        assert_eq!(service.configs.lock().unwrap().len(), 1);
        assert_eq!(task.to_string(), "configure-landscape");
    }
}
