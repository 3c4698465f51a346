//! The fleet owner's view: a named collection of instances.
//!
//! [`Fleet`] is an explicit registry object owned by the caller — not
//! process-wide state. It creates instances on demand, fans configuration
//! tasks out to all of them, and relays newly accepted connections to the
//! matching instance's slot. Each instance's queue and worker remain fully
//! independent; the fleet adds no cross-instance coordination.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::{InstanceError, SubmitError};
use crate::events::Bus;
use crate::instance::{Instance, InstanceOptions, Properties};
use crate::providers::{Activator, IdentityRegistry};
use crate::tasks::TaskRef;

/// Named collection of [`Instance`]s sharing one configuration and bus.
pub struct Fleet<C>
where
    C: Clone + Send + Sync + 'static,
{
    config: Config,
    registry: Arc<dyn IdentityRegistry>,
    activator: Arc<dyn Activator>,
    bus: Bus,
    instances: RwLock<HashMap<String, Arc<Instance<C>>>>,
}

impl<C> Fleet<C>
where
    C: Clone + Send + Sync + 'static,
{
    /// Creates an empty fleet.
    pub fn new(
        config: Config,
        registry: Arc<dyn IdentityRegistry>,
        activator: Arc<dyn Activator>,
        bus: Bus,
    ) -> Self {
        Self {
            config,
            registry,
            activator,
            bus,
            instances: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the instance under `name`, if the fleet holds one.
    pub async fn get(&self, name: &str) -> Option<Arc<Instance<C>>> {
        self.instances.read().await.get(name).cloned()
    }

    /// Returns the instance under `name`, creating and validating it first
    /// if absent.
    ///
    /// `properties` are only used when a new instance is created.
    pub async fn get_or_create(
        &self,
        name: &str,
        properties: Properties,
    ) -> Result<Arc<Instance<C>>, InstanceError> {
        if let Some(existing) = self.get(name).await {
            return Ok(existing);
        }

        // Write lock held across construction so two callers cannot race two
        // workers for the same name.
        let mut instances = self.instances.write().await;
        if let Some(existing) = instances.get(name) {
            return Ok(Arc::clone(existing));
        }

        let instance = Instance::new(
            name,
            properties,
            InstanceOptions::default(),
            Arc::clone(&self.registry),
            Arc::clone(&self.activator),
            &self.config,
            self.bus.clone(),
        )
        .await?;
        let instance = Arc::new(instance);
        instances.insert(name.to_string(), Arc::clone(&instance));
        Ok(instance)
    }

    /// Fans a configuration task out to every instance.
    ///
    /// `make_task` is called once per instance so each one gets its own task
    /// value (attempt counters are not shared). Returns the submissions that
    /// were refused, by instance name.
    pub async fn broadcast(
        &self,
        make_task: impl Fn() -> TaskRef<C>,
    ) -> Vec<(String, SubmitError)> {
        let instances = self.instances.read().await;
        let mut rejected = Vec::new();
        for (name, instance) in instances.iter() {
            if let Err(err) = instance.submit_task(make_task()) {
                rejected.push((name.clone(), err));
            }
        }
        rejected
    }

    /// Relays a newly accepted connection (or a teardown) to the named
    /// instance's slot.
    ///
    /// Returns `false` when the fleet holds no instance under `name`.
    pub async fn route_connection(&self, name: &str, client: Option<C>) -> bool {
        match self.get(name).await {
            Some(instance) => {
                instance.set_connection(client);
                true
            }
            None => false,
        }
    }

    /// Cleans up and removes every instance.
    pub async fn cleanup_all(&self) {
        let drained: Vec<Arc<Instance<C>>> = {
            let mut instances = self.instances.write().await;
            instances.drain().map(|(_, i)| i).collect()
        };
        for instance in drained {
            instance.cleanup().await;
        }
    }

    /// Number of instances currently held.
    pub async fn len(&self) -> usize {
        self.instances.read().await.len()
    }

    /// True if the fleet holds no instances.
    pub async fn is_empty(&self) -> bool {
        self.instances.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::testutil::{eventually, MapRegistry, RecordingActivator, TestClient};
    use crate::tasks::TaskFn;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fleet_with(registry: &Arc<MapRegistry>) -> Fleet<TestClient> {
        Fleet::new(
            Config::default(),
            registry.clone(),
            RecordingActivator::new(),
            Bus::new(64),
        )
    }

    #[tokio::test]
    async fn get_or_create_deduplicates_by_name() {
        let registry = MapRegistry::new();
        registry.register("vm-1");
        let fleet = fleet_with(&registry);

        let a = fleet
            .get_or_create("vm-1", Properties::default())
            .await
            .expect("registered name");
        let b = fleet
            .get_or_create("vm-1", Properties::default())
            .await
            .expect("registered name");
        assert!(Arc::ptr_eq(&a, &b), "same name must yield the same instance");
        assert_eq!(fleet.len().await, 1);

        fleet.cleanup_all().await;
    }

    #[tokio::test]
    async fn get_or_create_rejects_unknown_names() {
        let registry = MapRegistry::new();
        let fleet = fleet_with(&registry);

        let err = fleet
            .get_or_create("ghost", Properties::default())
            .await
            .expect_err("unknown name must fail");
        assert!(matches!(err, InstanceError::NotRegistered { .. }));
        assert!(fleet.is_empty().await, "nothing is created on failure");
    }

    #[tokio::test(start_paused = true)]
    async fn broadcast_reaches_every_instance() {
        let registry = MapRegistry::new();
        registry.register("vm-1");
        registry.register("vm-2");
        let fleet = fleet_with(&registry);
        fleet
            .get_or_create("vm-1", Properties::default())
            .await
            .expect("registered name");
        fleet
            .get_or_create("vm-2", Properties::default())
            .await
            .expect("registered name");

        assert!(fleet.route_connection("vm-1", Some(TestClient { id: 1 })).await);
        assert!(fleet.route_connection("vm-2", Some(TestClient { id: 2 })).await);

        let done = Arc::new(AtomicU32::new(0));
        let rejected = fleet
            .broadcast(|| {
                let done = done.clone();
                TaskFn::arc("configure", move |_ctx, _client: TestClient| {
                    let done = done.clone();
                    async move {
                        done.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, TaskError>(())
                    }
                })
            })
            .await;
        assert!(rejected.is_empty(), "all queues were empty: {rejected:?}");

        eventually("both instances executed", || {
            done.load(Ordering::SeqCst) == 2
        })
        .await;
        fleet.cleanup_all().await;
    }

    #[tokio::test]
    async fn route_connection_to_unknown_instance_reports_false() {
        let registry = MapRegistry::new();
        let fleet = fleet_with(&registry);
        assert!(!fleet.route_connection("ghost", Some(TestClient { id: 1 })).await);
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_all_closes_every_instance() {
        let registry = MapRegistry::new();
        registry.register("vm-1");
        let fleet = fleet_with(&registry);
        let vm = fleet
            .get_or_create("vm-1", Properties::default())
            .await
            .expect("registered name");

        fleet.cleanup_all().await;
        assert!(fleet.is_empty().await);
        assert_eq!(
            vm.submit_task(crate::testutil::CountingTask::ok()),
            Err(crate::SubmitError::Closed)
        );
    }
}
