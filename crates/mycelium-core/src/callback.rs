//! Capability keyed callback dispatch.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use mycelium_protocols::{Bean, BeanCallback, CallbackDirection, CallbackError, Capability};

use crate::registry::{instance_key, BeanRegistry};

#[derive(Clone)]
struct Registration {
    id: usize,
    target: Arc<dyn BeanCallback>,
}

impl Registration {
    fn new(target: Arc<dyn BeanCallback>) -> Self {
        Self {
            id: Arc::as_ptr(&target) as *const () as usize,
            target,
        }
    }
}

/// Holds on-add and on-remove callback registrations.
///
/// Registrations are append-only. On-add callbacks are fired in passes
/// ([`dispatch_on_add`](Self::dispatch_on_add)) and remember which bean
/// instances they already fired for, so a callback fires at most once per
/// instance no matter how many passes run.
#[derive(Default)]
pub struct CallbackDispatcher {
    on_add: DashMap<Capability, Vec<Registration>>,
    on_remove: DashMap<Capability, Vec<Registration>>,
    /// bean instance -> callbacks that already fired for it
    fired: DashMap<usize, HashSet<usize>>,
}

impl CallbackDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `target` for beans providing `capability`.
    pub fn register(
        &self,
        direction: CallbackDirection,
        capability: Capability,
        target: Arc<dyn BeanCallback>,
    ) -> Result<(), CallbackError> {
        if capability.is_empty() {
            return Err(CallbackError::InvalidCapability);
        }

        let map = match direction {
            CallbackDirection::OnAdd => &self.on_add,
            CallbackDirection::OnRemove => &self.on_remove,
        };
        debug!(capability = %capability, ?direction, "Registering callback");
        map.entry(capability)
            .or_default()
            .push(Registration::new(target));
        Ok(())
    }

    pub fn register_on_add(
        &self,
        capability: Capability,
        target: Arc<dyn BeanCallback>,
    ) -> Result<(), CallbackError> {
        self.register(CallbackDirection::OnAdd, capability, target)
    }

    pub fn register_on_remove(
        &self,
        capability: Capability,
        target: Arc<dyn BeanCallback>,
    ) -> Result<(), CallbackError> {
        self.register(CallbackDirection::OnRemove, capability, target)
    }

    /// Fire every on-add callback that has not yet fired for a matching bean.
    ///
    /// A failing callback is logged and stays unfired, so the next pass tries
    /// it again. Returns the number of successful invocations.
    pub fn dispatch_on_add(&self, registry: &BeanRegistry) -> usize {
        let registrations = snapshot(&self.on_add);
        if registrations.is_empty() {
            return 0;
        }

        let beans = registry.beans();
        let mut invoked = 0;
        for (capability, targets) in &registrations {
            for (name, bean) in &beans {
                if !bean.provides(capability) {
                    continue;
                }
                let key = instance_key(bean);
                for registration in targets {
                    // Claim before invoking so concurrent passes never both fire.
                    if !self.fired.entry(key).or_default().insert(registration.id) {
                        continue;
                    }
                    match registration.target.invoke(name, bean) {
                        Ok(()) => invoked += 1,
                        Err(e) => {
                            debug!(bean = %name, capability = %capability, error = %e, "On-add callback failed");
                            if let Some(mut fired) = self.fired.get_mut(&key) {
                                fired.remove(&registration.id);
                            }
                        }
                    }
                }
            }
        }
        invoked
    }

    /// Fire every on-remove callback matching `bean`, each at most once,
    /// then forget what fired for the instance.
    pub fn dispatch_on_remove(&self, name: &str, bean: &Arc<dyn Bean>) -> usize {
        let mut seen = HashSet::new();
        let mut invoked = 0;
        for (capability, targets) in snapshot(&self.on_remove) {
            if !bean.provides(&capability) {
                continue;
            }
            for registration in targets {
                if !seen.insert(registration.id) {
                    continue;
                }
                match registration.target.invoke(name, bean) {
                    Ok(()) => invoked += 1,
                    Err(e) => {
                        debug!(bean = %name, capability = %capability, error = %e, "On-remove callback failed");
                    }
                }
            }
        }
        self.forget(bean);
        invoked
    }

    /// Whether `target` already fired on-add for this bean instance.
    pub fn has_fired(&self, bean: &Arc<dyn Bean>, target: &Arc<dyn BeanCallback>) -> bool {
        let id = Arc::as_ptr(target) as *const () as usize;
        self.fired
            .get(&instance_key(bean))
            .is_some_and(|fired| fired.contains(&id))
    }

    pub fn on_add_count(&self) -> usize {
        self.on_add.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn on_remove_count(&self) -> usize {
        self.on_remove.iter().map(|entry| entry.value().len()).sum()
    }

    pub(crate) fn forget(&self, bean: &Arc<dyn Bean>) {
        self.fired.remove(&instance_key(bean));
    }
}

/// Copy registrations out so callbacks can register further callbacks
/// without deadlocking on a shard lock.
fn snapshot(map: &DashMap<Capability, Vec<Registration>>) -> Vec<(Capability, Vec<Registration>)> {
    map.iter()
        .map(|entry| (entry.key().clone(), entry.value().clone()))
        .collect()
}

#[cfg(test)]
#[path = "callback_tests.rs"]
mod tests;
