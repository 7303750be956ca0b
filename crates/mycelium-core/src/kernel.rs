//! The deployment kernel: startup and shutdown of every wave.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use mycelium_config::KernelConfig;
use mycelium_protocols::{
    BeanStatus, DeployReport, Deployer, DescriptorSource, Environment, EnvironmentBuilder,
    EventListener, HotDeployWatcher, KernelError, KernelEvent, Locator, Managed,
    ManagementRegistrar, RemoteAccess, RemoteCollaborator,
};

use crate::callback::CallbackDispatcher;
use crate::environment::{scan_units, DirectoryEnvironmentBuilder, RootDirectory};
use crate::lifecycle::{KernelState, LifecycleManager, ShutdownSignal};
use crate::management::{InMemoryRegistrar, KernelInfo, WatcherManaged};
use crate::orchestrator::DeploymentOrchestrator;
use crate::phases::DeployerPhaseCoordinator;
use crate::pool::WorkerPool;
use crate::registry::BeanRegistry;

/// Name the kernel registers itself under.
pub const KERNEL_BEAN: &str = "Kernel";

/// Assembles a [`Kernel`] and its collaborators.
pub struct KernelBuilder {
    config: KernelConfig,
    deployers: Vec<Arc<dyn Deployer>>,
    listeners: Vec<Arc<dyn EventListener>>,
    environment_builder: Arc<dyn EnvironmentBuilder>,
    registrar: Arc<dyn ManagementRegistrar>,
    descriptor_source: Option<Arc<dyn DescriptorSource>>,
    watcher: Option<Arc<dyn HotDeployWatcher>>,
    remote: Option<Arc<dyn RemoteCollaborator>>,
}

impl KernelBuilder {
    pub fn new(config: KernelConfig) -> Self {
        Self {
            config,
            deployers: Vec::new(),
            listeners: Vec::new(),
            environment_builder: Arc::new(DirectoryEnvironmentBuilder),
            registrar: Arc::new(InMemoryRegistrar::new()),
            descriptor_source: None,
            watcher: None,
            remote: None,
        }
    }

    pub fn deployer(mut self, deployer: Arc<dyn Deployer>) -> Self {
        self.deployers.push(deployer);
        self
    }

    pub fn listener(mut self, listener: Arc<dyn EventListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn environment_builder(mut self, builder: Arc<dyn EnvironmentBuilder>) -> Self {
        self.environment_builder = builder;
        self
    }

    pub fn registrar(mut self, registrar: Arc<dyn ManagementRegistrar>) -> Self {
        self.registrar = registrar;
        self
    }

    pub fn descriptor_source(mut self, source: Arc<dyn DescriptorSource>) -> Self {
        self.descriptor_source = Some(source);
        self
    }

    pub fn hot_deploy_watcher(mut self, watcher: Arc<dyn HotDeployWatcher>) -> Self {
        self.watcher = Some(watcher);
        self
    }

    pub fn remote(mut self, remote: Arc<dyn RemoteCollaborator>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn build(self) -> Kernel {
        let callbacks = Arc::new(CallbackDispatcher::new());
        let registry = Arc::new(BeanRegistry::new(callbacks));
        let phases = Arc::new(DeployerPhaseCoordinator::new());
        let pool = Arc::new(WorkerPool::new(
            self.config.name.clone(),
            self.config.pool.clone(),
        ));
        let orchestrator = Arc::new(
            DeploymentOrchestrator::new(registry.clone(), phases.clone(), pool.clone())
                .with_join_timeout(self.config.deploy_timeout()),
        );
        for deployer in self.deployers {
            orchestrator.add_deployer(deployer);
        }

        Kernel {
            config: self.config,
            lifecycle: LifecycleManager::with_listeners(self.listeners),
            registry,
            phases,
            pool,
            orchestrator,
            environment_builder: self.environment_builder,
            registrar: self.registrar,
            descriptor_source: self.descriptor_source,
            watcher: self.watcher,
            remote: self.remote,
            runtime: Mutex::new(RuntimeState::default()),
        }
    }
}

/// What startup produced and shutdown has to release.
#[derive(Default)]
struct RuntimeState {
    root: Option<Arc<RootDirectory>>,
    environment: Option<Arc<dyn Environment>>,
    watcher_started: bool,
    remote_started: bool,
}

/// The deployment micro-kernel.
///
/// Owns the bean registry, the callback dispatcher, the phase coordinator and
/// the orchestrator, and drives them through the startup and shutdown
/// sequences.
pub struct Kernel {
    config: KernelConfig,
    lifecycle: LifecycleManager,
    registry: Arc<BeanRegistry>,
    phases: Arc<DeployerPhaseCoordinator>,
    pool: Arc<WorkerPool>,
    orchestrator: Arc<DeploymentOrchestrator>,
    environment_builder: Arc<dyn EnvironmentBuilder>,
    registrar: Arc<dyn ManagementRegistrar>,
    descriptor_source: Option<Arc<dyn DescriptorSource>>,
    watcher: Option<Arc<dyn HotDeployWatcher>>,
    remote: Option<Arc<dyn RemoteCollaborator>>,
    runtime: Mutex<RuntimeState>,
}

impl Kernel {
    pub fn builder(config: KernelConfig) -> KernelBuilder {
        KernelBuilder::new(config)
    }

    /// Run the startup sequence.
    ///
    /// Unit failures never fail startup; they are logged and the wave goes
    /// on. Any other failure stops the kernel and is returned.
    pub async fn start(&self) -> Result<(), KernelError> {
        self.lifecycle.begin_start()?;

        match self.startup().await {
            Ok(()) => {
                self.lifecycle.finish_start()?;
                Ok(())
            }
            Err(e) => {
                error!("Kernel startup failed: {}", e);
                self.lifecycle.abort();
                self.pool.shutdown();
                self.registry.remove(KERNEL_BEAN);
                let root = self.runtime.lock().root.take();
                if let Some(root) = root {
                    if let Err(cleanup) = root.cleanup() {
                        warn!("Temporary root left behind: {}", cleanup);
                    }
                }
                Err(e)
            }
        }
    }

    async fn startup(&self) -> Result<(), KernelError> {
        self.lifecycle.emit(KernelEvent::Starting).await?;

        self.pool.start()?;

        let root = Arc::new(RootDirectory::resolve(&self.config)?);
        self.runtime.lock().root = Some(root.clone());
        let root_path = root.path();
        let config_dir = self.config.config_dir(root_path);

        self.lifecycle.emit(KernelEvent::PreEnvironment).await?;
        let roots: Vec<PathBuf> = [self.config.library_dir(root_path), config_dir.clone()]
            .into_iter()
            .flatten()
            .collect();
        let environment = self
            .environment_builder
            .build(&roots)
            .map_err(|e| KernelError::Environment(e.to_string()))?;
        self.runtime.lock().environment = Some(environment.clone());
        self.lifecycle.emit(KernelEvent::PostEnvironment).await?;

        // The registry holds the orchestrator through this bean until
        // shutdown removes it.
        let info = Arc::new(
            KernelInfo::new(self.config.name.clone()).with_control(self.orchestrator.clone()),
        );
        self.register_managed("Kernel", info.clone())?;
        self.register_managed("MainDeployer", self.orchestrator.clone())?;

        self.registry.put(KERNEL_BEAN, info.clone())?;
        self.registry.set_status(KERNEL_BEAN, BeanStatus::Started)?;
        info!("{} {} starting", self.config.name, info.version());

        if let Some(dir) = config_dir.as_deref() {
            self.deploy_bootstrap(dir).await?;
        }

        self.phases.pre_deploy(&self.registry).await;

        if let Some(dir) = self.config.system_dir(root_path) {
            self.deploy_system(&dir, &*environment).await?;
        }
        if let Some(dir) = self.config.deploy_dir(root_path) {
            self.deploy_user(&dir, &*environment).await?;
        }

        self.phases.post_deploy(&self.registry).await;

        self.start_remote()?;

        self.lifecycle.emit(KernelEvent::Started).await?;
        info!("{} started", self.config.name);
        Ok(())
    }

    async fn deploy_bootstrap(&self, config_dir: &Path) -> Result<(), KernelError> {
        let Some(source) = &self.descriptor_source else {
            return Ok(());
        };
        let units = source
            .bootstrap_locators(config_dir)
            .map_err(|e| KernelError::Config(e.to_string()))?;
        let Some(units) = units else {
            debug!("No bootstrap descriptor in {}", config_dir.display());
            return Ok(());
        };

        let locators: Vec<Locator> = units
            .iter()
            .map(|unit| resolve_unit(config_dir, unit))
            .collect();
        info!("Bootstrap wave: {} units", locators.len());
        self.orchestrator.expect_units(locators.len());
        let report = self.orchestrator.deploy(locators, true).await;
        self.report_wave("bootstrap", &report);
        Ok(())
    }

    async fn deploy_system(
        &self,
        dir: &Path,
        environment: &dyn Environment,
    ) -> Result<(), KernelError> {
        let scanned = scan_units(dir, &self.config.descriptor_suffix)?;
        if scanned.locators.is_empty() {
            return Ok(());
        }
        environment.extend(&scanned.others);

        info!(
            "System wave: {} units ({} descriptors)",
            scanned.locators.len(),
            scanned.descriptors
        );
        self.orchestrator.expect_units(scanned.descriptors);
        let report = self
            .orchestrator
            .deploy(scanned.locators, self.config.parallel_deploy)
            .await;
        self.report_wave("system", &report);
        Ok(())
    }

    async fn deploy_user(
        &self,
        dir: &Path,
        environment: &dyn Environment,
    ) -> Result<(), KernelError> {
        let scanned = scan_units(dir, &self.config.descriptor_suffix)?;
        environment.extend(&scanned.others);

        let watcher = self.hot_deploy_watcher();
        if let Some(watcher) = &watcher {
            for locator in &scanned.locators {
                watcher.register(locator);
            }
        }

        self.orchestrator.expect_units(scanned.descriptors);
        if !scanned.locators.is_empty() {
            info!(
                "User wave: {} units ({} descriptors)",
                scanned.locators.len(),
                scanned.descriptors
            );
            let report = self
                .orchestrator
                .deploy(scanned.locators, self.config.parallel_deploy)
                .await;
            self.report_wave("user", &report);
        }

        if let Some(watcher) = watcher {
            self.register_managed("HotDeployer", Arc::new(WatcherManaged(watcher.clone())))?;
            watcher
                .start(self.orchestrator.clone())
                .await
                .map_err(|e| KernelError::Collaborator(format!("hot deployer: {e}")))?;
            self.runtime.lock().watcher_started = true;
            info!(
                "Hot deployment enabled (interval {:?})",
                self.config.hot_deployment_interval()
            );
        }
        Ok(())
    }

    fn start_remote(&self) -> Result<(), KernelError> {
        if !self.config.remote_access {
            return Ok(());
        }
        let Some(remote) = self.remote.clone() else {
            warn!("Remote access is enabled but no remote collaborator is configured");
            return Ok(());
        };

        let access = RemoteAccess {
            control: self.orchestrator.clone(),
            watcher: self.hot_deploy_watcher(),
            bind_address: self.config.bind_address.clone(),
            port: self.config.remote_port,
        };
        self.pool.spawn(async move {
            if let Err(e) = remote.serve(access).await {
                error!("Remote collaborator failed: {}", e);
            }
        })?;
        self.runtime.lock().remote_started = true;
        info!("Remote access on port {}", self.config.remote_port);
        Ok(())
    }

    /// Run the shutdown sequence.
    ///
    /// A failing teardown hook aborts the unwind and is returned; the kernel
    /// still ends up `Stopped`.
    pub async fn shutdown(&self) -> Result<(), KernelError> {
        self.lifecycle.begin_stop()?;

        let result = self.teardown().await;
        match &result {
            Ok(()) => self.lifecycle.finish_stop()?,
            Err(e) => {
                error!("Kernel shutdown failed: {}", e);
                self.lifecycle.abort();
            }
        }
        result
    }

    async fn teardown(&self) -> Result<(), KernelError> {
        info!("{} stopping", self.config.name);
        self.lifecycle.emit(KernelEvent::Stopping).await?;
        self.lifecycle.shutdown_signal().trigger();

        let (watcher_started, remote_started) = {
            let runtime = self.runtime.lock();
            (runtime.watcher_started, runtime.remote_started)
        };
        let watcher = self.hot_deploy_watcher();
        if let Some(watcher) = watcher.as_ref().filter(|_| watcher_started) {
            if let Err(e) = watcher.stop().await {
                warn!("Hot deployer failed to stop: {}", e);
            }
        }
        if let Some(remote) = self.remote.as_ref().filter(|_| remote_started) {
            if let Err(e) = remote.stop().await {
                warn!("Remote collaborator failed to stop: {}", e);
            }
        }

        self.pool.shutdown();

        self.orchestrator.shutdown_all(watcher.as_ref()).await?;

        self.registry.remove(KERNEL_BEAN);
        for name in self.registry.names() {
            self.registry.remove(&name);
        }

        self.registrar.release();

        let (environment, root) = {
            let mut runtime = self.runtime.lock();
            (runtime.environment.take(), runtime.root.take())
        };
        if let Some(environment) = environment {
            if let Err(e) = environment.teardown() {
                debug!("Environment teardown failed: {}", e);
            }
        }
        if let Some(root) = root {
            root.cleanup()?;
        }

        info!("{} stopped", self.config.name);
        self.lifecycle.emit(KernelEvent::Stopped).await?;
        Ok(())
    }

    fn hot_deploy_watcher(&self) -> Option<Arc<dyn HotDeployWatcher>> {
        self.watcher
            .clone()
            .filter(|_| self.config.hot_deployment)
    }

    fn register_managed(
        &self,
        kind: &str,
        object: Arc<dyn Managed>,
    ) -> Result<(), KernelError> {
        let name = format!("{}:name={}", self.config.name, kind);
        self.registrar
            .register(&name, object)
            .map_err(|e| KernelError::Registrar(format!("{name}: {e}")))
    }

    fn report_wave(&self, wave: &str, report: &DeployReport) {
        if !report.is_success() {
            warn!(
                "{} wave: {} of {} units failed",
                wave,
                report.failed.len(),
                report.total()
            );
        }
        if !self.orchestrator.all_units_settled() {
            debug!(
                "{} wave: {} expected units still pending",
                wave,
                self.orchestrator.pending_units()
            );
        }
    }

    /// Get kernel state.
    pub fn state(&self) -> KernelState {
        self.lifecycle.state()
    }

    /// Check if kernel is running.
    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    /// Get shutdown signal for graceful shutdown.
    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        self.lifecycle.shutdown_signal()
    }

    pub async fn register_listener(&self, listener: Arc<dyn EventListener>) {
        self.lifecycle.register_listener(listener).await;
    }

    pub fn add_deployer(&self, deployer: Arc<dyn Deployer>) {
        self.orchestrator.add_deployer(deployer);
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<BeanRegistry> {
        &self.registry
    }

    pub fn callbacks(&self) -> &Arc<CallbackDispatcher> {
        self.registry.callbacks()
    }

    pub fn phases(&self) -> &Arc<DeployerPhaseCoordinator> {
        &self.phases
    }

    pub fn orchestrator(&self) -> &Arc<DeploymentOrchestrator> {
        &self.orchestrator
    }

    /// Root directory in use while the kernel is started.
    pub fn root_dir(&self) -> Option<PathBuf> {
        self.runtime
            .lock()
            .root
            .as_ref()
            .map(|root| root.path().to_path_buf())
    }

    pub fn search_path(&self) -> Vec<PathBuf> {
        self.runtime
            .lock()
            .environment
            .as_ref()
            .map(|env| env.search_path())
            .unwrap_or_default()
    }
}

/// Bootstrap entries are relative to the config directory unless absolute
/// or carrying a scheme.
fn resolve_unit(config_dir: &Path, unit: &str) -> Locator {
    if unit.contains("://") || Path::new(unit).is_absolute() {
        Locator::new(unit)
    } else {
        Locator::from_path(config_dir.join(unit))
    }
}

#[cfg(test)]
#[path = "kernel_tests.rs"]
mod tests;
