//! Deployer registration for the Mycelium binary.

use std::sync::Arc;

use tracing::info;

use mycelium_config::{KernelConfig, TomlDescriptorSource};
use mycelium_core::{Kernel, KernelBuilder};
use mycelium_descriptor_deployer::DescriptorDeployer;

/// Build a kernel with the bundled deployers and the TOML bootstrap source.
pub(crate) fn build_kernel(config: KernelConfig) -> Kernel {
    let suffix = config.descriptor_suffix.clone();
    let builder = Kernel::builder(config);
    let builder = register_deployers(builder, &suffix);
    builder.descriptor_source(Arc::new(TomlDescriptorSource)).build()
}

fn register_deployers(builder: KernelBuilder, suffix: &str) -> KernelBuilder {
    info!(suffix, "Registered descriptor deployer");
    builder.deployer(Arc::new(DescriptorDeployer::new(suffix)))
}
