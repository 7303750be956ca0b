//! Generic bean produced from a descriptor entry.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::debug;

use mycelium_protocols::{Bean, Capability, DeployerPhases, PhaseError};

use crate::descriptor::BeanDefinition;

/// A bean described entirely by its descriptor entry.
#[derive(Debug)]
pub struct DescriptorBean {
    name: String,
    capabilities: Vec<Capability>,
    properties: BTreeMap<String, toml::Value>,
    phased: bool,
    pre_deploys: AtomicUsize,
    post_deploys: AtomicUsize,
}

impl DescriptorBean {
    pub fn new(definition: &BeanDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            capabilities: definition
                .capabilities
                .iter()
                .map(|c| Capability::new(c.as_str()))
                .collect(),
            properties: definition.properties.clone(),
            phased: definition.phased,
            pre_deploys: AtomicUsize::new(0),
            post_deploys: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property(&self, key: &str) -> Option<&toml::Value> {
        self.properties.get(key)
    }

    pub fn is_phased(&self) -> bool {
        self.phased
    }

    /// Times the pre-deploy hook ran.
    pub fn pre_deploys(&self) -> usize {
        self.pre_deploys.load(Ordering::SeqCst)
    }

    /// Times the post-deploy hook ran.
    pub fn post_deploys(&self) -> usize {
        self.post_deploys.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeployerPhases for DescriptorBean {
    async fn pre_deploy(&self) -> Result<(), PhaseError> {
        debug!(bean = %self.name, "Pre-deploy");
        self.pre_deploys.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn post_deploy(&self) -> Result<(), PhaseError> {
        debug!(bean = %self.name, "Post-deploy");
        self.post_deploys.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Bean for DescriptorBean {
    fn capabilities(&self) -> Vec<Capability> {
        self.capabilities.clone()
    }

    fn as_deployer_phases(&self) -> Option<&dyn DeployerPhases> {
        self.phased.then_some(self as &dyn DeployerPhases)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
