//! Deployment orchestration.
//!
//! A batch of locators is fanned out over the [`WorkerPool`], one task per
//! unit, each working through its own [`DeployerHandle`]. The batch joins on
//! a [`JoinBarrier`] before on-add callbacks are dispatched, so callbacks
//! always see every bean the batch produced.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use mycelium_protocols::{
    BeanStatus, DeployContext, DeployError, DeployReport, Deployer, DeploymentControl,
    HotDeployWatcher, KernelError, Locator, Managed, Teardown,
};

use crate::barrier::{ArrivalGuard, JoinBarrier};
use crate::handle::DeployerHandle;
use crate::phases::DeployerPhaseCoordinator;
use crate::pool::WorkerPool;
use crate::registry::BeanRegistry;

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

/// A unit that finished activating.
#[derive(Clone)]
pub struct DeploymentRecord {
    locator: Locator,
    beans: Vec<String>,
    teardown: Option<Arc<dyn Teardown>>,
    deployed_at: DateTime<Utc>,
}

impl DeploymentRecord {
    pub(crate) fn new(
        locator: Locator,
        beans: Vec<String>,
        teardown: Option<Arc<dyn Teardown>>,
    ) -> Self {
        Self {
            locator,
            beans,
            teardown,
            deployed_at: Utc::now(),
        }
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Beans the unit registered, in registration order.
    pub fn beans(&self) -> &[String] {
        &self.beans
    }

    pub fn has_teardown(&self) -> bool {
        self.teardown.is_some()
    }

    pub fn deployed_at(&self) -> DateTime<Utc> {
        self.deployed_at
    }
}

impl fmt::Debug for DeploymentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeploymentRecord")
            .field("locator", &self.locator)
            .field("beans", &self.beans)
            .field("has_teardown", &self.has_teardown())
            .field("deployed_at", &self.deployed_at)
            .finish()
    }
}

/// State every [`DeployerHandle`] shares with the orchestrator.
#[derive(Clone)]
pub(crate) struct SharedState {
    pub(crate) registry: Arc<BeanRegistry>,
    pub(crate) phases: Arc<DeployerPhaseCoordinator>,
    deployments: Arc<Mutex<Vec<DeploymentRecord>>>,
    pending_units: Arc<AtomicI64>,
}

impl SharedState {
    pub(crate) fn register_deployment(&self, record: DeploymentRecord) {
        info!(
            locator = %record.locator,
            beans = record.beans.len(),
            "Deployed unit"
        );
        self.deployments.lock().push(record);
        self.pending_units.fetch_sub(1, Ordering::SeqCst);
    }
}

type UnitOutcome = Arc<Mutex<Option<Result<(), DeployError>>>>;

/// Schedules deployment units and keeps the list of live deployments.
pub struct DeploymentOrchestrator {
    shared: SharedState,
    pool: Arc<WorkerPool>,
    deployers: RwLock<Vec<Arc<dyn Deployer>>>,
    join_timeout: Option<Duration>,
}

impl DeploymentOrchestrator {
    pub fn new(
        registry: Arc<BeanRegistry>,
        phases: Arc<DeployerPhaseCoordinator>,
        pool: Arc<WorkerPool>,
    ) -> Self {
        Self {
            shared: SharedState {
                registry,
                phases,
                deployments: Arc::new(Mutex::new(Vec::new())),
                pending_units: Arc::new(AtomicI64::new(0)),
            },
            pool,
            deployers: RwLock::new(Vec::new()),
            join_timeout: None,
        }
    }

    /// Bound the wait for one batch. Units still running when it elapses are
    /// reported as timed out.
    pub fn with_join_timeout(mut self, limit: Option<Duration>) -> Self {
        self.join_timeout = limit;
        self
    }

    /// Add a unit deployer. The first deployer accepting a locator wins.
    pub fn add_deployer(&self, deployer: Arc<dyn Deployer>) {
        info!(deployer = deployer.name(), "Registered deployer");
        self.deployers.write().push(deployer);
    }

    pub fn deployer_count(&self) -> usize {
        self.deployers.read().len()
    }

    pub fn registry(&self) -> &Arc<BeanRegistry> {
        &self.shared.registry
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Set how many units the next wave is expected to deploy.
    pub fn expect_units(&self, count: usize) {
        self.shared
            .pending_units
            .store(count as i64, Ordering::SeqCst);
    }

    pub fn pending_units(&self) -> i64 {
        self.shared.pending_units.load(Ordering::SeqCst)
    }

    pub fn all_units_settled(&self) -> bool {
        self.pending_units() <= 0
    }

    /// Deploy `locators` in file name order and dispatch on-add callbacks
    /// once afterwards.
    ///
    /// In parallel mode all units form one batch; otherwise every unit is a
    /// batch of its own. Unit failures are collected in the report.
    pub async fn deploy(&self, mut locators: Vec<Locator>, parallel: bool) -> DeployReport {
        locators.sort();
        locators.dedup();
        debug!(units = locators.len(), parallel, "Deploying batch");

        let mut report = DeployReport::default();
        if parallel {
            report.merge(self.run_batch(locators).await);
        } else {
            for locator in locators {
                report.merge(self.run_batch(vec![locator]).await);
            }
        }

        let registry = &self.shared.registry;
        let fired = registry.callbacks().dispatch_on_add(registry);
        debug!(fired, "Dispatched on-add callbacks");

        info!(
            deployed = report.deployed.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Deployment batch finished"
        );
        report
    }

    async fn run_batch(&self, locators: Vec<Locator>) -> DeployReport {
        let mut report = DeployReport::default();
        let barrier = Arc::new(JoinBarrier::new(locators.len()));
        let mut scheduled: Vec<(Locator, UnitOutcome)> = Vec::with_capacity(locators.len());

        for locator in locators {
            if self.find_deployment(&locator).is_some() {
                warn!(%locator, "Unit is already deployed");
                report.skipped.push(locator);
                barrier.arrive();
                continue;
            }
            let Some(deployer) = self.deployer_for(&locator) else {
                debug!(%locator, "No deployer accepts unit");
                report.skipped.push(locator);
                barrier.arrive();
                continue;
            };

            let outcome: UnitOutcome = Arc::new(Mutex::new(None));
            let handle = DeployerHandle::new(self.shared.clone(), locator.clone());
            let guard = ArrivalGuard::new(barrier.clone());
            // A rejected task drops its guard, which arrives for it.
            if let Err(e) = self.pool.spawn(activate(deployer, handle, outcome.clone(), guard)) {
                warn!(%locator, error = %e, "Unit could not be scheduled");
                let rejected = DeployError::Rejected(locator.to_string());
                report.failed.push((locator, rejected));
                continue;
            }
            scheduled.push((locator, outcome));
        }

        let settled = match self.join_timeout {
            Some(limit) => barrier.wait_timeout(limit).await,
            None => {
                barrier.wait().await;
                true
            }
        };
        if !settled {
            warn!(
                remaining = barrier.remaining(),
                "Deployment batch did not settle in time"
            );
        }

        for (locator, outcome) in scheduled {
            let result = outcome.lock().take();
            match result {
                Some(Ok(())) => report.deployed.push(locator),
                Some(Err(e)) => {
                    error!(%locator, error = %e, "Deployment unit failed");
                    report.failed.push((locator, e));
                }
                None if !settled => {
                    let secs = self.join_timeout.map_or(0.0, |d| d.as_secs_f64());
                    let timed_out = DeployError::TimedOut {
                        locator: locator.to_string(),
                        secs,
                    };
                    error!(%locator, "Deployment unit timed out");
                    report.failed.push((locator, timed_out));
                }
                None => {
                    error!(%locator, "Deployment unit panicked");
                    let panicked = DeployError::Panicked(locator.to_string());
                    report.failed.push((locator, panicked));
                }
            }
        }
        report
    }

    fn deployer_for(&self, locator: &Locator) -> Option<Arc<dyn Deployer>> {
        self.deployers
            .read()
            .iter()
            .find(|d| d.accepts(locator))
            .cloned()
    }

    pub fn find_deployment(&self, locator: &Locator) -> Option<DeploymentRecord> {
        self.shared
            .deployments
            .lock()
            .iter()
            .find(|d| &d.locator == locator)
            .cloned()
    }

    /// Live deployments in registration order.
    pub fn deployments(&self) -> Vec<DeploymentRecord> {
        self.shared.deployments.lock().clone()
    }

    /// Tear one deployment down and forget it.
    pub async fn undeploy(&self, locator: &Locator) -> Result<(), KernelError> {
        let record = self
            .find_deployment(locator)
            .ok_or_else(|| KernelError::NotDeployed(locator.to_string()))?;
        self.shutdown_deployment(&record).await?;
        info!(%locator, "Undeployed unit");
        Ok(())
    }

    /// Tear every deployment down, last registered first.
    ///
    /// The first failing teardown hook aborts the unwind; deployments not yet
    /// reached stay registered.
    pub async fn shutdown_all(
        &self,
        watcher: Option<&Arc<dyn HotDeployWatcher>>,
    ) -> Result<(), KernelError> {
        let deployments = self.deployments();
        for record in deployments.iter().rev() {
            if let Some(watcher) = watcher {
                watcher.unregister(&record.locator);
            }
            self.shutdown_deployment(record).await?;
        }
        Ok(())
    }

    async fn shutdown_deployment(&self, record: &DeploymentRecord) -> Result<(), KernelError> {
        debug!(locator = %record.locator, "Shutting down deployment");
        if let Some(teardown) = &record.teardown {
            let failed = |source: DeployError| KernelError::Teardown {
                locator: record.locator.to_string(),
                source,
            };
            teardown.stop().await.map_err(failed)?;
            teardown.destroy().await.map_err(failed)?;
        }

        for name in record.beans.iter().rev() {
            self.unwind_bean(name);
        }
        self.shared
            .deployments
            .lock()
            .retain(|d| d.locator != record.locator);
        Ok(())
    }

    fn unwind_bean(&self, name: &str) {
        let registry = &self.shared.registry;
        if !registry.contains(name) {
            return;
        }
        for status in [BeanStatus::Stopping, BeanStatus::Stopped] {
            if let Err(e) = registry.set_status(name, status) {
                debug!(bean = %name, error = %e, "Skipping status change");
            }
        }
        registry.remove(name);
    }
}

async fn activate(
    deployer: Arc<dyn Deployer>,
    mut handle: DeployerHandle,
    outcome: UnitOutcome,
    _guard: ArrivalGuard,
) {
    debug!(locator = %handle.locator(), deployer = deployer.name(), "Activating unit");
    let result = deployer.deploy(&mut handle).await;
    if result.is_ok() {
        handle.complete();
    }
    *outcome.lock() = Some(result);
}

#[async_trait]
impl DeploymentControl for DeploymentOrchestrator {
    async fn deploy(&self, locators: Vec<Locator>, parallel: bool) -> DeployReport {
        DeploymentOrchestrator::deploy(self, locators, parallel).await
    }

    async fn undeploy(&self, locator: &Locator) -> Result<(), KernelError> {
        DeploymentOrchestrator::undeploy(self, locator).await
    }

    fn deployed(&self) -> Vec<Locator> {
        self.shared
            .deployments
            .lock()
            .iter()
            .map(|d| d.locator.clone())
            .collect()
    }
}

impl Managed for DeploymentOrchestrator {
    fn attributes(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("Deployments".to_string(), self.shared.deployments.lock().len().to_string()),
            ("Deployers".to_string(), self.deployer_count().to_string()),
            ("PendingUnits".to_string(), self.pending_units().to_string()),
            ("Beans".to_string(), self.shared.registry.len().to_string()),
            ("PoolWorkers".to_string(), self.pool.workers().to_string()),
            ("PoolRunning".to_string(), self.pool.is_running().to_string()),
        ])
    }
}
