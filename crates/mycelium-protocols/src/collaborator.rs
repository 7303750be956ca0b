//! External collaborators consumed by the kernel.
//!
//! None of these are implemented by the kernel core; the kernel calls them
//! at fixed points of its startup and shutdown sequences.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::deployment::{DeploymentControl, Locator};
use crate::error::BoxError;

/// An isolated search path built from the library and config directories.
pub trait Environment: Send + Sync {
    /// Entries of the search path, in lookup order.
    fn search_path(&self) -> Vec<PathBuf>;

    /// Extend the search path at runtime (units outside the descriptor
    /// suffix contribute here).
    fn extend(&self, _entries: &[PathBuf]) {}

    /// Release everything held by the environment.
    fn teardown(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Builds the [`Environment`] once at startup.
pub trait EnvironmentBuilder: Send + Sync {
    fn build(&self, roots: &[PathBuf]) -> Result<Arc<dyn Environment>, BoxError>;
}

/// An object exposed for introspection through a [`ManagementRegistrar`].
pub trait Managed: Send + Sync {
    /// Attribute snapshot shown to inspectors.
    fn attributes(&self) -> BTreeMap<String, String>;
}

/// Registrar for introspectable objects. Purely observational.
pub trait ManagementRegistrar: Send + Sync {
    fn register(&self, name: &str, object: Arc<dyn Managed>) -> Result<(), BoxError>;

    fn unregister(&self, name: &str) -> Result<(), BoxError>;

    /// Drop every registration; called once at shutdown.
    fn release(&self);
}

/// Watches the deploy directory and calls back into [`DeploymentControl`]
/// on change. The kernel itself never polls.
#[async_trait]
pub trait HotDeployWatcher: Send + Sync {
    /// A unit was found (or deployed) at `locator`.
    fn register(&self, locator: &Locator);

    /// A unit at `locator` is going away.
    fn unregister(&self, locator: &Locator);

    async fn start(&self, control: Arc<dyn DeploymentControl>) -> Result<(), BoxError>;

    async fn stop(&self) -> Result<(), BoxError>;

    /// Attribute snapshot for the management registrar.
    fn attributes(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

/// What a remote command collaborator gets to work with.
#[derive(Clone)]
pub struct RemoteAccess {
    pub control: Arc<dyn DeploymentControl>,
    pub watcher: Option<Arc<dyn HotDeployWatcher>>,
    pub bind_address: Option<String>,
    pub port: u16,
}

/// Out-of-band command channel (deploy, undeploy, introspect).
///
/// `serve` runs on the kernel's worker pool until `stop` is called.
#[async_trait]
pub trait RemoteCollaborator: Send + Sync {
    async fn serve(&self, access: RemoteAccess) -> Result<(), BoxError>;

    async fn stop(&self) -> Result<(), BoxError>;
}

/// Source of the bootstrap unit list, parsed outside the kernel.
pub trait DescriptorSource: Send + Sync {
    /// Ordered locators of the bootstrap units, relative to `config_dir`
    /// unless absolute. `None` when there is no bootstrap descriptor.
    fn bootstrap_locators(&self, config_dir: &Path) -> Result<Option<Vec<String>>, BoxError>;
}
