//! Per-unit deploy context.

use std::sync::Arc;

use mycelium_protocols::{
    Bean, BeanCallback, BeanStatus, CallbackError, Capability, DeployContext, Locator,
    RegistryError, Teardown,
};

use crate::orchestrator::{DeploymentRecord, SharedState};

/// The isolated view one deployment unit works through.
///
/// Shared state (registry, dispatcher, phase coordinator) is reached through
/// `Arc`s; everything the unit records about itself stays local until the
/// unit completes and the handle is turned into a [`DeploymentRecord`].
pub struct DeployerHandle {
    shared: SharedState,
    locator: Locator,
    beans: Vec<String>,
    teardown: Option<Arc<dyn Teardown>>,
}

impl DeployerHandle {
    pub(crate) fn new(shared: SharedState, locator: Locator) -> Self {
        Self {
            shared,
            locator,
            beans: Vec::new(),
            teardown: None,
        }
    }

    /// Beans registered through this handle, in registration order.
    pub fn bean_names(&self) -> &[String] {
        &self.beans
    }

    /// Register the finished unit as a deployment and count it settled.
    pub(crate) fn complete(self) {
        let record = DeploymentRecord::new(self.locator, self.beans, self.teardown);
        self.shared.register_deployment(record);
    }
}

impl DeployContext for DeployerHandle {
    fn locator(&self) -> &Locator {
        &self.locator
    }

    fn register_bean(&mut self, name: &str, bean: Arc<dyn Bean>) -> Result<(), RegistryError> {
        self.shared.registry.put(name, bean)?;
        if !self.beans.iter().any(|n| n == name) {
            self.beans.push(name.to_string());
        }
        Ok(())
    }

    fn bean(&self, name: &str) -> Option<Arc<dyn Bean>> {
        self.shared.registry.get(name)
    }

    fn set_status(&self, name: &str, status: BeanStatus) -> Result<(), RegistryError> {
        self.shared.registry.set_status(name, status)
    }

    fn status(&self, name: &str) -> Option<BeanStatus> {
        self.shared.registry.status(name)
    }

    fn add_dependant(&self, from: &str, to: &str) {
        self.shared.registry.add_dependant(from, to);
    }

    fn register_on_add(
        &self,
        capability: Capability,
        target: Arc<dyn BeanCallback>,
    ) -> Result<(), CallbackError> {
        self.shared
            .registry
            .callbacks()
            .register_on_add(capability, target)
    }

    fn register_on_remove(
        &self,
        capability: Capability,
        target: Arc<dyn BeanCallback>,
    ) -> Result<(), CallbackError> {
        self.shared
            .registry
            .callbacks()
            .register_on_remove(capability, target)
    }

    fn mark_phase_aware(&self, name: &str) {
        self.shared.phases.mark_phase_aware(name);
    }

    fn set_teardown(&mut self, teardown: Arc<dyn Teardown>) {
        self.teardown = Some(teardown);
    }
}
