//! End-to-end boot of a kernel over TOML unit descriptors.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use mycelium_config::{KernelConfig, PoolConfig, TomlDescriptorSource};
use mycelium_core::{
    BeanRegistry, DeployerPhaseCoordinator, DeploymentOrchestrator, Kernel, KernelState,
    WorkerPool,
};
use mycelium_descriptor_deployer::{DescriptorBean, DescriptorDeployer};
use mycelium_protocols::{BeanStatus, DeployError, Locator};

fn pool_config() -> PoolConfig {
    PoolConfig {
        core_workers: Some(2),
        ..Default::default()
    }
}

fn write(root: &Path, file: &str, content: &str) {
    let path = root.join(file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[tokio::test]
async fn test_kernel_boots_descriptor_units() {
    let home = tempfile::tempdir().unwrap();
    let root = home.path();
    write(root, "config/bootstrap.toml", r#"units = ["naming.toml"]"#);
    write(
        root,
        "config/naming.toml",
        r#"
        [[bean]]
        name = "Naming"
        phased = true
        "#,
    );
    write(
        root,
        "system/transactions.toml",
        r#"
        [[bean]]
        name = "TransactionManager"
        "#,
    );
    write(
        root,
        "deploy/datasource.toml",
        r#"
        [[bean]]
        name = "DataSource"
        depends = ["TransactionManager"]
        capabilities = ["Pool"]

        [bean.properties]
        url = "jdbc:h2:mem:test"
        "#,
    );
    write(root, "deploy/broken.toml", "[[bean]\nname = ");

    let config = KernelConfig {
        home: Some(root.to_path_buf()),
        pool: pool_config(),
        ..Default::default()
    };
    let kernel = Kernel::builder(config)
        .deployer(Arc::new(DescriptorDeployer::default()))
        .descriptor_source(Arc::new(TomlDescriptorSource))
        .build();

    kernel.start().await.unwrap();
    assert_eq!(kernel.state(), KernelState::Running);

    let registry = kernel.registry();
    for name in ["Naming", "TransactionManager", "DataSource"] {
        assert_eq!(registry.status(name), Some(BeanStatus::Started), "{name}");
    }
    let dependants = registry.dependants_of("TransactionManager").unwrap();
    assert!(dependants.contains("DataSource"));

    let url = registry.with_bean("DataSource", |bean: &DescriptorBean| {
        bean.property("url").and_then(|v| v.as_str()).map(str::to_string)
    });
    assert_eq!(url, Some(Some("jdbc:h2:mem:test".to_string())));

    let hooks = registry.with_bean("Naming", |bean: &DescriptorBean| {
        (bean.pre_deploys(), bean.post_deploys())
    });
    assert_eq!(hooks, Some((1, 1)));

    assert_eq!(kernel.orchestrator().deployments().len(), 3);

    kernel.shutdown().await.unwrap();
    assert!(kernel.registry().is_empty());
}

#[tokio::test]
async fn test_invalid_descriptor_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "dup.toml", "[[bean]]\nname = \"A\"\n[[bean]]\nname = \"A\"\n");
    write(dir.path(), "ok.toml", "[[bean]]\nname = \"B\"\n");

    let pool = Arc::new(WorkerPool::new("descriptor-test", pool_config()));
    pool.start().unwrap();
    let orchestrator = DeploymentOrchestrator::new(
        Arc::new(BeanRegistry::default()),
        Arc::new(DeployerPhaseCoordinator::new()),
        pool,
    );
    orchestrator.add_deployer(Arc::new(DescriptorDeployer::default()));

    let dup = Locator::from_path(dir.path().join("dup.toml"));
    let ok = Locator::from_path(dir.path().join("ok.toml"));
    let remote = Locator::new("http://example.com/unit.toml");
    let report = orchestrator
        .deploy(vec![dup.clone(), ok.clone(), remote.clone()], true)
        .await;

    assert_eq!(report.deployed, vec![ok]);
    assert_eq!(report.skipped, vec![remote]);
    assert!(matches!(
        report.failure(&dup),
        Some(DeployError::InvalidDescriptor { .. })
    ));
    assert!(orchestrator.registry().contains("B"));
    assert!(!orchestrator.registry().contains("A"));
}

#[test]
fn test_custom_suffix() {
    let deployer = DescriptorDeployer::new(".unit.toml");
    assert_eq!(deployer.suffix(), ".unit.toml");
}
