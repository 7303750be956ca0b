//! Deployer, deploy context and teardown traits.

use std::sync::Arc;

use async_trait::async_trait;

use super::{DeployReport, Locator};
use crate::bean::{Bean, BeanCallback, BeanStatus, Capability};
use crate::error::{CallbackError, DeployError, KernelError, RegistryError};

/// What a unit deployer can do with the kernel while activating one unit.
///
/// Every unit gets its own context, so state recorded here (the beans the
/// unit registered, its teardown hook) never leaks between units deployed
/// concurrently.
pub trait DeployContext: Send {
    /// Locator of the unit being activated.
    fn locator(&self) -> &Locator;

    /// Register a bean and remember it as belonging to this unit.
    fn register_bean(&mut self, name: &str, bean: Arc<dyn Bean>) -> Result<(), RegistryError>;

    /// Look up any bean currently registered.
    fn bean(&self, name: &str) -> Option<Arc<dyn Bean>>;

    fn set_status(&self, name: &str, status: BeanStatus) -> Result<(), RegistryError>;

    fn status(&self, name: &str) -> Option<BeanStatus>;

    /// Record that `to` depends on `from`.
    fn add_dependant(&self, from: &str, to: &str);

    fn register_on_add(
        &self,
        capability: Capability,
        target: Arc<dyn BeanCallback>,
    ) -> Result<(), CallbackError>;

    fn register_on_remove(
        &self,
        capability: Capability,
        target: Arc<dyn BeanCallback>,
    ) -> Result<(), CallbackError>;

    /// Opt a bean into the pre/post deploy notification of the current wave.
    fn mark_phase_aware(&self, name: &str);

    /// Attach stop/destroy hooks run when the unit is torn down.
    fn set_teardown(&mut self, teardown: Arc<dyn Teardown>);
}

/// Activates deployment units of the kinds it accepts.
#[async_trait]
pub trait Deployer: Send + Sync {
    /// Human readable name used in logs.
    fn name(&self) -> &str;

    /// Whether this deployer handles `locator`.
    fn accepts(&self, locator: &Locator) -> bool;

    /// Activate the unit behind `ctx.locator()`.
    async fn deploy(&self, ctx: &mut dyn DeployContext) -> Result<(), DeployError>;
}

/// Optional hooks of a deployed unit, run in LIFO order at shutdown.
///
/// A unit without a teardown is simply forgotten; a unit whose hook fails
/// stops the unwind.
#[async_trait]
pub trait Teardown: Send + Sync {
    async fn stop(&self) -> Result<(), DeployError> {
        Ok(())
    }

    async fn destroy(&self) -> Result<(), DeployError> {
        Ok(())
    }
}

/// Deploy/undeploy entry points exposed to the hot-deploy watcher and
/// the remote command collaborator.
#[async_trait]
pub trait DeploymentControl: Send + Sync {
    async fn deploy(&self, locators: Vec<Locator>, parallel: bool) -> DeployReport;

    async fn undeploy(&self, locator: &Locator) -> Result<(), KernelError>;

    /// Locators of all live deployments, in registration order.
    fn deployed(&self) -> Vec<Locator>;
}
