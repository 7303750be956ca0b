//! Name keyed bean store with status tracking and a dependants graph.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use mycelium_protocols::{Bean, BeanStatus, RegistryError};

use super::instance_key;
use crate::callback::CallbackDispatcher;

/// Registry of every bean known to the kernel.
///
/// All maps are safe for concurrent use from deployment units running in
/// parallel. Removing a bean fires the matching on-remove callbacks of the
/// shared [`CallbackDispatcher`] before its status is dropped.
pub struct BeanRegistry {
    beans: DashMap<String, Arc<dyn Bean>>,
    status: DashMap<String, BeanStatus>,
    dependants: DashMap<String, HashSet<String>>,
    callbacks: Arc<CallbackDispatcher>,
}

impl BeanRegistry {
    pub fn new(callbacks: Arc<CallbackDispatcher>) -> Self {
        Self {
            beans: DashMap::new(),
            status: DashMap::new(),
            dependants: DashMap::new(),
            callbacks,
        }
    }

    /// Dispatcher fired on bean removal.
    pub fn callbacks(&self) -> &Arc<CallbackDispatcher> {
        &self.callbacks
    }

    /// Register `bean` under `name`, replacing any previous instance.
    ///
    /// A new instance starts out as [`BeanStatus::NotStarted`]; putting the
    /// same instance again keeps its status.
    pub fn put(&self, name: &str, bean: Arc<dyn Bean>) -> Result<(), RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::InvalidName(name.to_string()));
        }

        let key = instance_key(&bean);
        match self.beans.insert(name.to_string(), bean) {
            Some(previous) if instance_key(&previous) == key => {}
            Some(previous) => {
                debug!(bean = %name, "Replacing registered bean");
                self.callbacks.forget(&previous);
                self.status.insert(name.to_string(), BeanStatus::NotStarted);
            }
            None => {
                self.status.insert(name.to_string(), BeanStatus::NotStarted);
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Bean>> {
        self.beans.get(name).map(|bean| bean.clone())
    }

    /// Run `f` against the bean registered as `name` if it is a `T`.
    pub fn with_bean<T: 'static, R>(&self, name: &str, f: impl FnOnce(&T) -> R) -> Option<R> {
        let bean = self.get(name)?;
        bean.as_any().downcast_ref::<T>().map(f)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.beans.contains_key(name)
    }

    /// Remove a bean, firing the on-remove callbacks that match it.
    ///
    /// Callbacks run while the bean and its status are still registered;
    /// both are dropped afterwards. Returns the removed instance. Removing an
    /// unknown name only clears a stray status entry.
    pub fn remove(&self, name: &str) -> Option<Arc<dyn Bean>> {
        let Some(bean) = self.get(name) else {
            self.status.remove(name);
            return None;
        };
        self.callbacks.dispatch_on_remove(name, &bean);

        let key = instance_key(&bean);
        let removed = self
            .beans
            .remove_if(name, |_, current| instance_key(current) == key)
            .map(|(_, bean)| bean);
        if removed.is_some() {
            self.status.remove(name);
        }
        removed
    }

    /// Update a bean's status. Status never moves backwards.
    pub fn set_status(&self, name: &str, status: BeanStatus) -> Result<(), RegistryError> {
        match self.status.entry(name.to_string()) {
            Entry::Occupied(mut entry) => {
                let current = *entry.get();
                if !current.can_transition_to(status) {
                    return Err(RegistryError::StatusRegression {
                        name: name.to_string(),
                        from: current,
                        to: status,
                    });
                }
                entry.insert(status);
            }
            Entry::Vacant(entry) => {
                entry.insert(status);
            }
        }
        Ok(())
    }

    pub fn status(&self, name: &str) -> Option<BeanStatus> {
        self.status.get(name).map(|status| *status)
    }

    /// Record that `to` depends on `from`. Idempotent.
    pub fn add_dependant(&self, from: &str, to: &str) {
        self.dependants
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
    }

    /// Names of the beans depending on `name`, if any were recorded.
    pub fn dependants_of(&self, name: &str) -> Option<HashSet<String>> {
        self.dependants.get(name).map(|set| set.clone())
    }

    pub fn names(&self) -> Vec<String> {
        self.beans.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Snapshot of every registered bean.
    pub fn beans(&self) -> Vec<(String, Arc<dyn Bean>)> {
        self.beans
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.beans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }
}

impl Default for BeanRegistry {
    fn default() -> Self {
        Self::new(Arc::new(CallbackDispatcher::new()))
    }
}

#[cfg(test)]
#[path = "bean_tests.rs"]
mod tests;
