//! Deployer for TOML unit descriptors.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use mycelium_protocols::{BeanStatus, DeployContext, DeployError, Deployer, Locator};

use crate::bean::DescriptorBean;
use crate::descriptor::UnitDescriptor;

const DEFAULT_SUFFIX: &str = ".toml";

/// Activates units whose locator ends with the descriptor suffix.
#[derive(Debug, Clone)]
pub struct DescriptorDeployer {
    suffix: String,
}

impl DescriptorDeployer {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl Default for DescriptorDeployer {
    fn default() -> Self {
        Self::new(DEFAULT_SUFFIX)
    }
}

#[async_trait]
impl Deployer for DescriptorDeployer {
    fn name(&self) -> &str {
        "descriptor"
    }

    fn accepts(&self, locator: &Locator) -> bool {
        locator.has_suffix(&self.suffix) && locator.to_path().is_some()
    }

    async fn deploy(&self, ctx: &mut dyn DeployContext) -> Result<(), DeployError> {
        let locator = ctx.locator().clone();
        let path = locator
            .to_path()
            .ok_or_else(|| DeployError::activation(&locator, "not a local file"))?;

        let content = tokio::fs::read_to_string(&path).await?;
        let descriptor =
            UnitDescriptor::parse(&content).map_err(|e| DeployError::InvalidDescriptor {
                locator: locator.to_string(),
                message: e.to_string(),
            })?;

        for definition in &descriptor.beans {
            let name = definition.name.as_str();
            ctx.register_bean(name, Arc::new(DescriptorBean::new(definition)))?;
            for dependency in &definition.depends {
                ctx.add_dependant(dependency, name);
            }
            ctx.set_status(name, BeanStatus::Started)?;
            if definition.phased {
                ctx.mark_phase_aware(name);
            }
            debug!(%locator, bean = %name, "Registered descriptor bean");
        }

        info!(%locator, beans = descriptor.beans.len(), "Descriptor deployed");
        Ok(())
    }
}
