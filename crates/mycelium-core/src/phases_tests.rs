use super::*;
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mycelium_protocols::{Bean, DeployerPhases, PhaseError};

#[derive(Default)]
struct PhasedBean {
    pre: AtomicUsize,
    post: AtomicUsize,
    fail_pre: bool,
}

#[async_trait]
impl DeployerPhases for PhasedBean {
    async fn pre_deploy(&self) -> Result<(), PhaseError> {
        self.pre.fetch_add(1, Ordering::SeqCst);
        if self.fail_pre {
            return Err(PhaseError::PreDeployFailed("boom".into()));
        }
        Ok(())
    }

    async fn post_deploy(&self) -> Result<(), PhaseError> {
        self.post.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Bean for PhasedBean {
    fn as_deployer_phases(&self) -> Option<&dyn DeployerPhases> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct PlainBean;

impl Bean for PlainBean {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[tokio::test]
async fn test_pre_and_post_deploy() {
    let registry = BeanRegistry::default();
    let coordinator = DeployerPhaseCoordinator::new();
    let bean = Arc::new(PhasedBean::default());
    registry.put("P", bean.clone()).unwrap();
    coordinator.mark_phase_aware("P");

    assert_eq!(coordinator.pre_deploy(&registry).await, 1);
    assert_eq!(coordinator.post_deploy(&registry).await, 1);

    assert_eq!(bean.pre.load(Ordering::SeqCst), 1);
    assert_eq!(bean.post.load(Ordering::SeqCst), 1);
    assert!(coordinator.pending().is_empty());
}

#[tokio::test]
async fn test_post_deploy_clears_pending() {
    let registry = BeanRegistry::default();
    let coordinator = DeployerPhaseCoordinator::new();
    let bean = Arc::new(PhasedBean::default());
    registry.put("P", bean.clone()).unwrap();
    coordinator.mark_phase_aware("P");

    coordinator.post_deploy(&registry).await;
    coordinator.post_deploy(&registry).await;

    assert_eq!(bean.post.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_and_plain_beans_are_skipped() {
    let registry = BeanRegistry::default();
    let coordinator = DeployerPhaseCoordinator::new();
    registry.put("plain", Arc::new(PlainBean)).unwrap();
    coordinator.mark_phase_aware("plain");
    coordinator.mark_phase_aware("gone");

    assert_eq!(coordinator.pre_deploy(&registry).await, 0);
    assert_eq!(coordinator.pending().len(), 2);
}

#[tokio::test]
async fn test_failing_hook_does_not_stop_others() {
    let registry = BeanRegistry::default();
    let coordinator = DeployerPhaseCoordinator::new();
    let failing = Arc::new(PhasedBean {
        fail_pre: true,
        ..Default::default()
    });
    let healthy = Arc::new(PhasedBean::default());
    registry.put("A", failing.clone()).unwrap();
    registry.put("B", healthy.clone()).unwrap();
    coordinator.mark_phase_aware("A");
    coordinator.mark_phase_aware("B");

    assert_eq!(coordinator.pre_deploy(&registry).await, 1);
    assert_eq!(failing.pre.load(Ordering::SeqCst), 1);
    assert_eq!(healthy.pre.load(Ordering::SeqCst), 1);
}
