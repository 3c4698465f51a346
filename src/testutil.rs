//! Shared test doubles: an in-memory registry, a recording activator, and an
//! instrumented task.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{ActivationError, TaskError};
use crate::providers::{Activator, IdentityRegistry};
use crate::tasks::{RetryBudget, Task};

/// Mutable in-memory name → identity map.
pub(crate) struct MapRegistry {
    entries: Mutex<HashMap<String, Uuid>>,
}

impl MapRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(HashMap::new()),
        })
    }

    pub fn register(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.entries.lock().unwrap().insert(name.to_string(), id);
        id
    }

    pub fn unregister(&self, name: &str) {
        self.entries.lock().unwrap().remove(name);
    }
}

#[async_trait]
impl IdentityRegistry for MapRegistry {
    async fn identity(&self, name: &str) -> Option<Uuid> {
        self.entries.lock().unwrap().get(name).copied()
    }
}

/// Activator that records every wake call and optionally fails them all.
pub(crate) struct RecordingActivator {
    pub calls: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingActivator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        })
    }
}

#[async_trait]
impl Activator for RecordingActivator {
    async fn ensure_running(&self, name: &str) -> Result<(), ActivationError> {
        self.calls.lock().unwrap().push(name.to_string());
        if self.fail {
            return Err(ActivationError::new(name, "simulated wake failure"));
        }
        Ok(())
    }
}

/// Stand-in client capability; `id` tells connections apart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TestClient {
    pub id: u8,
}

/// Instrumented task: counts executions, records the client it ran against,
/// and can fail, block until cancelled, or wait on an external gate.
pub(crate) struct CountingTask {
    pub calls: AtomicU32,
    pub seen: Mutex<Vec<u8>>,
    pub cancelled: AtomicBool,
    fail_with: Option<String>,
    budget: Option<RetryBudget>,
    block_until_cancel: bool,
    gate: Option<Arc<Semaphore>>,
}

impl CountingTask {
    fn base() -> Self {
        Self {
            calls: AtomicU32::new(0),
            seen: Mutex::new(Vec::new()),
            cancelled: AtomicBool::new(false),
            fail_with: None,
            budget: None,
            block_until_cancel: false,
            gate: None,
        }
    }

    /// Succeeds immediately.
    pub fn ok() -> Arc<Self> {
        Arc::new(Self::base())
    }

    /// Always fails, allowing up to `max_attempts` executions.
    pub fn failing(max_attempts: u32) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some("simulated task failure".to_string()),
            budget: Some(RetryBudget::new(max_attempts)),
            ..Self::base()
        })
    }

    /// Runs until its context is cancelled; would retry forever otherwise.
    pub fn blocking() -> Arc<Self> {
        Arc::new(Self {
            block_until_cancel: true,
            budget: Some(RetryBudget::new(u32::MAX)),
            ..Self::base()
        })
    }

    /// Succeeds once a permit shows up on `gate`.
    pub fn gated(gate: Arc<Semaphore>) -> Arc<Self> {
        Arc::new(Self {
            gate: Some(gate),
            ..Self::base()
        })
    }
}

impl fmt::Display for CountingTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("counting-task")
    }
}

#[async_trait]
impl Task<TestClient> for CountingTask {
    async fn execute(&self, ctx: CancellationToken, client: TestClient) -> Result<(), TaskError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(client.id);
        if let Some(budget) = &self.budget {
            budget.record_attempt();
        }

        if self.block_until_cancel {
            ctx.cancelled().await;
            self.cancelled.store(true, Ordering::SeqCst);
            return Err(TaskError::Cancelled);
        }

        if let Some(gate) = &self.gate {
            tokio::select! {
                permit = gate.acquire() => permit.expect("gate closed").forget(),
                _ = ctx.cancelled() => {
                    self.cancelled.store(true, Ordering::SeqCst);
                    return Err(TaskError::Cancelled);
                }
            }
        }

        match &self.fail_with {
            Some(message) => Err(TaskError::fail(message.clone())),
            None => Ok(()),
        }
    }

    fn should_retry(&self) -> bool {
        self.budget.as_ref().is_some_and(|b| !b.exhausted())
    }
}

/// Polls `cond` until it holds, panicking with `what` after ~10 simulated
/// seconds. Instant under a paused clock.
pub(crate) async fn eventually(what: &str, cond: impl Fn() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("condition not reached: {what}");
}
