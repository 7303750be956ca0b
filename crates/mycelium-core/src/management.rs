//! In-process management registrar and the kernel's own managed objects.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use mycelium_protocols::{
    Bean, BoxError, DeploymentControl, HotDeployWatcher, Managed, ManagementRegistrar,
};

/// Keeps managed objects in memory, keyed by name.
#[derive(Default)]
pub struct InMemoryRegistrar {
    objects: DashMap<String, Arc<dyn Managed>>,
    released: AtomicBool,
}

impl InMemoryRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.objects.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn attributes(&self, name: &str) -> Option<BTreeMap<String, String>> {
        self.objects.get(name).map(|object| object.attributes())
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl ManagementRegistrar for InMemoryRegistrar {
    fn register(&self, name: &str, object: Arc<dyn Managed>) -> Result<(), BoxError> {
        if self.is_released() {
            return Err(format!("registrar released, cannot register {name}").into());
        }
        if self.objects.contains_key(name) {
            return Err(format!("{name} is already registered").into());
        }
        debug!("Registered managed object {}", name);
        self.objects.insert(name.to_string(), object);
        Ok(())
    }

    fn unregister(&self, name: &str) -> Result<(), BoxError> {
        self.objects
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| format!("{name} is not registered").into())
    }

    fn release(&self) {
        self.objects.clear();
        self.released.store(true, Ordering::SeqCst);
    }
}

/// The kernel itself, as a bean and as a managed object.
///
/// Beans looking up the `Kernel` bean reach the deployment entry points
/// through [`KernelInfo::control`].
#[derive(Clone)]
pub struct KernelInfo {
    name: String,
    version: &'static str,
    started_at: DateTime<Utc>,
    control: Option<Arc<dyn DeploymentControl>>,
}

impl KernelInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION"),
            started_at: Utc::now(),
            control: None,
        }
    }

    pub fn with_control(mut self, control: Arc<dyn DeploymentControl>) -> Self {
        self.control = Some(control);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        self.version
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Deploy and undeploy entry points of the owning kernel.
    pub fn control(&self) -> Option<&Arc<dyn DeploymentControl>> {
        self.control.as_ref()
    }
}

impl fmt::Debug for KernelInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelInfo")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("started_at", &self.started_at)
            .field("has_control", &self.control.is_some())
            .finish()
    }
}

impl Bean for KernelInfo {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Managed for KernelInfo {
    fn attributes(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("Name".to_string(), self.name.clone()),
            ("Version".to_string(), self.version.to_string()),
            ("StartedAt".to_string(), self.started_at.to_rfc3339()),
        ])
    }
}

/// Exposes a hot-deploy watcher through the registrar.
pub(crate) struct WatcherManaged(pub(crate) Arc<dyn HotDeployWatcher>);

impl Managed for WatcherManaged {
    fn attributes(&self) -> BTreeMap<String, String> {
        self.0.attributes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_inspect() {
        let registrar = InMemoryRegistrar::new();
        registrar
            .register("mycelium:name=Kernel", Arc::new(KernelInfo::new("mycelium")))
            .unwrap();

        assert_eq!(registrar.names(), vec!["mycelium:name=Kernel".to_string()]);
        let attributes = registrar.attributes("mycelium:name=Kernel").unwrap();
        assert_eq!(attributes.get("Name").map(String::as_str), Some("mycelium"));
        assert!(attributes.contains_key("Version"));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let registrar = InMemoryRegistrar::new();
        let info = Arc::new(KernelInfo::new("k"));
        registrar.register("k", info.clone()).unwrap();
        assert!(registrar.register("k", info).is_err());
    }

    #[test]
    fn test_unregister() {
        let registrar = InMemoryRegistrar::new();
        registrar.register("k", Arc::new(KernelInfo::new("k"))).unwrap();
        registrar.unregister("k").unwrap();
        assert!(registrar.unregister("k").is_err());
    }

    #[test]
    fn test_release_clears_and_blocks() {
        let registrar = InMemoryRegistrar::new();
        registrar.register("k", Arc::new(KernelInfo::new("k"))).unwrap();

        registrar.release();

        assert!(registrar.is_released());
        assert!(registrar.names().is_empty());
        assert!(registrar.register("k2", Arc::new(KernelInfo::new("k"))).is_err());
    }
}
