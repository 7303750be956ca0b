//! Kernel lifecycle events.

use std::fmt;

use async_trait::async_trait;

use crate::error::BoxError;

/// Lifecycle event, emitted in declaration order over one kernel lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelEvent {
    Starting,
    /// Right before the isolated search path is built.
    PreEnvironment,
    /// Right after the isolated search path is built.
    PostEnvironment,
    Started,
    Stopping,
    Stopped,
}

impl fmt::Display for KernelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KernelEvent::Starting => "STARTING",
            KernelEvent::PreEnvironment => "PRE_ENVIRONMENT",
            KernelEvent::PostEnvironment => "POST_ENVIRONMENT",
            KernelEvent::Started => "STARTED",
            KernelEvent::Stopping => "STOPPING",
            KernelEvent::Stopped => "STOPPED",
        };
        f.write_str(name)
    }
}

/// Receives kernel lifecycle events.
///
/// Errors are not isolated: a failing listener aborts the startup or
/// shutdown sequence it was called from.
#[async_trait]
pub trait EventListener: Send + Sync {
    async fn on_event(&self, event: KernelEvent) -> Result<(), BoxError>;
}
