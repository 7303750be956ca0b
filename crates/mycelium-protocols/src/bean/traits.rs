//! Bean, callback and phase hook traits.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use super::Capability;
use crate::error::{CallbackError, PhaseError};

/// An object registered into the kernel under a unique name.
///
/// Capabilities are declared explicitly; the kernel never inspects the
/// concrete type to decide whether a callback applies.
pub trait Bean: Send + Sync + 'static {
    /// Capability tags this bean satisfies.
    fn capabilities(&self) -> Vec<Capability> {
        Vec::new()
    }

    /// Whether this bean satisfies `capability`.
    fn provides(&self, capability: &Capability) -> bool {
        self.capabilities().iter().any(|c| c == capability)
    }

    /// Pre/post deploy hooks, for beans that opt into phase notification.
    fn as_deployer_phases(&self) -> Option<&dyn DeployerPhases> {
        None
    }

    /// Returns a reference to the bean as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Target of an on-add or on-remove callback registration.
///
/// The identity of the `Arc` holding the callback is its identity in the
/// dispatcher: registering the same `Arc` twice never makes it fire twice
/// for one bean.
pub trait BeanCallback: Send + Sync {
    fn invoke(&self, name: &str, bean: &Arc<dyn Bean>) -> Result<(), CallbackError>;
}

impl<F> BeanCallback for F
where
    F: Fn(&str, &Arc<dyn Bean>) -> Result<(), CallbackError> + Send + Sync,
{
    fn invoke(&self, name: &str, bean: &Arc<dyn Bean>) -> Result<(), CallbackError> {
        self(name, bean)
    }
}

/// Notification around a deployment wave.
#[async_trait]
pub trait DeployerPhases: Send + Sync {
    /// Called once before the units of a wave are activated.
    async fn pre_deploy(&self) -> Result<(), PhaseError>;

    /// Called once after the wave completed.
    async fn post_deploy(&self) -> Result<(), PhaseError>;
}
