//! Pre/post deploy notification of a deployment wave.

use std::collections::BTreeSet;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::registry::BeanRegistry;

#[derive(Debug, Clone, Copy)]
enum Phase {
    Pre,
    Post,
}

/// Tracks the beans that asked to be told when a wave starts and ends.
///
/// Names are collected while units activate. `post_deploy` clears the set,
/// so every wave notifies its own beans only.
#[derive(Default)]
pub struct DeployerPhaseCoordinator {
    pending: Mutex<BTreeSet<String>>,
}

impl DeployerPhaseCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_phase_aware(&self, name: &str) {
        self.pending.lock().insert(name.to_string());
    }

    pub fn pending(&self) -> Vec<String> {
        self.pending.lock().iter().cloned().collect()
    }

    pub async fn pre_deploy(&self, registry: &BeanRegistry) -> usize {
        self.notify(registry, Phase::Pre).await
    }

    pub async fn post_deploy(&self, registry: &BeanRegistry) -> usize {
        let notified = self.notify(registry, Phase::Post).await;
        self.pending.lock().clear();
        notified
    }

    /// Returns the number of hooks that completed without error.
    async fn notify(&self, registry: &BeanRegistry, phase: Phase) -> usize {
        let names = self.pending();
        let mut completed = 0;

        for name in names {
            let Some(bean) = registry.get(&name) else {
                warn!(bean = %name, ?phase, "Phase aware bean is no longer registered");
                continue;
            };
            let Some(hooks) = bean.as_deployer_phases() else {
                warn!(bean = %name, ?phase, "Bean was marked phase aware but has no phase hooks");
                continue;
            };

            let result = match phase {
                Phase::Pre => hooks.pre_deploy().await,
                Phase::Post => hooks.post_deploy().await,
            };
            match result {
                Ok(()) => {
                    debug!(bean = %name, ?phase, "Phase hook completed");
                    completed += 1;
                }
                Err(e) => warn!(bean = %name, ?phase, error = %e, "Phase hook failed"),
            }
        }
        completed
    }
}

#[cfg(test)]
#[path = "phases_tests.rs"]
mod tests;
