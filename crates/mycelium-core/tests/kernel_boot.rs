//! Boots a kernel over a real directory layout and checks callback wiring
//! across deployment waves.

use std::any::Any;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mycelium_config::{KernelConfig, PoolConfig};
use mycelium_core::{Kernel, KernelState};
use mycelium_protocols::{
    Bean, BeanCallback, BeanStatus, CallbackError, Capability, DeployContext, DeployError,
    Deployer, Locator,
};

const POOL: Capability = Capability::from_static("Pool");

struct PoolBean;

impl Bean for PoolBean {
    fn capabilities(&self) -> Vec<Capability> {
        vec![POOL]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Default)]
struct PoolWatcher {
    added: AtomicUsize,
    removed: AtomicUsize,
}

struct OnAdd(Arc<PoolWatcher>);
struct OnRemove(Arc<PoolWatcher>);

impl BeanCallback for OnAdd {
    fn invoke(&self, _name: &str, _bean: &Arc<dyn Bean>) -> Result<(), CallbackError> {
        self.0.added.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl BeanCallback for OnRemove {
    fn invoke(&self, _name: &str, _bean: &Arc<dyn Bean>) -> Result<(), CallbackError> {
        self.0.removed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// `*.unit` files: `watch` registers the pool callbacks, `pool` registers a
/// pool bean named after the file.
struct UnitDeployer {
    watcher: Arc<PoolWatcher>,
}

#[async_trait]
impl Deployer for UnitDeployer {
    fn name(&self) -> &str {
        "unit"
    }

    fn accepts(&self, locator: &Locator) -> bool {
        locator.has_suffix(".unit")
    }

    async fn deploy(&self, ctx: &mut dyn DeployContext) -> Result<(), DeployError> {
        let path = ctx
            .locator()
            .to_path()
            .ok_or_else(|| DeployError::Custom("not a file".into()))?;
        let kind = fs::read_to_string(&path)?;
        let name = ctx.locator().file_name().to_string();

        match kind.trim() {
            "watch" => {
                ctx.register_on_add(POOL, Arc::new(OnAdd(self.watcher.clone())))?;
                ctx.register_on_remove(POOL, Arc::new(OnRemove(self.watcher.clone())))?;
            }
            "pool" => {
                ctx.register_bean(&name, Arc::new(PoolBean))?;
                ctx.set_status(&name, BeanStatus::Started)?;
            }
            other => {
                return Err(DeployError::activation(ctx.locator(), format!("unknown kind {other}")));
            }
        }
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_callbacks_across_waves() {
    let home = tempfile::tempdir().unwrap();
    for dir in ["system", "deploy"] {
        fs::create_dir(home.path().join(dir)).unwrap();
    }
    fs::write(home.path().join("system/watch.unit"), "watch").unwrap();
    fs::write(home.path().join("system/early.unit"), "pool").unwrap();
    fs::write(home.path().join("deploy/late.unit"), "pool").unwrap();
    fs::write(home.path().join("deploy/broken.unit"), "???").unwrap();

    let watcher = Arc::new(PoolWatcher::default());
    let config = KernelConfig {
        home: Some(home.path().to_path_buf()),
        descriptor_suffix: ".unit".to_string(),
        pool: PoolConfig {
            core_workers: Some(4),
            ..Default::default()
        },
        ..Default::default()
    };
    let kernel = Kernel::builder(config)
        .deployer(Arc::new(UnitDeployer {
            watcher: watcher.clone(),
        }))
        .build();

    kernel.start().await.unwrap();

    assert_eq!(kernel.state(), KernelState::Running);
    assert_eq!(watcher.added.load(Ordering::SeqCst), 2);
    // `broken.unit` is the one user-wave descriptor that never deployed.
    assert_eq!(kernel.orchestrator().pending_units(), 1);
    assert_eq!(kernel.orchestrator().deployments().len(), 3);

    kernel.shutdown().await.unwrap();

    assert_eq!(watcher.removed.load(Ordering::SeqCst), 2);
    assert_eq!(watcher.added.load(Ordering::SeqCst), 2);
    assert!(kernel.registry().is_empty());
}
