//! Kernel lifecycle management.
//!
//! Tracks the kernel state machine and fans lifecycle events out to the
//! registered listeners:
//! - Created -> Starting -> Running -> Stopping -> Stopped
//! - A failed start lands in Stopped directly

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio::sync::{RwLock, broadcast};
use tracing::{debug, error};

use mycelium_protocols::{EventListener, KernelError, KernelEvent};

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

/// Kernel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum KernelState {
    /// Initial state, not started.
    Created = 0,
    /// Running the startup sequence.
    Starting = 1,
    /// Started; units are deployed.
    Running = 2,
    /// Running the shutdown sequence.
    Stopping = 3,
    /// Stopped. Terminal.
    Stopped = 4,
}

impl From<u8> for KernelState {
    fn from(v: u8) -> Self {
        match v {
            0 => KernelState::Created,
            1 => KernelState::Starting,
            2 => KernelState::Running,
            3 => KernelState::Stopping,
            4 => KernelState::Stopped,
            _ => KernelState::Created,
        }
    }
}

/// Shutdown signal for graceful shutdown.
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: broadcast::Sender<()>,
}

impl ShutdownSignal {
    /// Create a new shutdown signal.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    /// Trigger shutdown.
    pub fn trigger(&self) {
        let _ = self.sender.send(());
    }

    /// Subscribe to shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// State machine plus the ordered list of event listeners.
pub struct LifecycleManager {
    state: AtomicU8,
    listeners: RwLock<Vec<Arc<dyn EventListener>>>,
    shutdown_signal: ShutdownSignal,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self::with_listeners(Vec::new())
    }

    pub fn with_listeners(listeners: Vec<Arc<dyn EventListener>>) -> Self {
        Self {
            state: AtomicU8::new(KernelState::Created as u8),
            listeners: RwLock::new(listeners),
            shutdown_signal: ShutdownSignal::new(),
        }
    }

    /// Get current state.
    pub fn state(&self) -> KernelState {
        KernelState::from(self.state.load(Ordering::SeqCst))
    }

    /// Check if running.
    pub fn is_running(&self) -> bool {
        self.state() == KernelState::Running
    }

    /// Append a listener. Listeners are notified in registration order.
    pub async fn register_listener(&self, listener: Arc<dyn EventListener>) {
        self.listeners.write().await.push(listener);
    }

    pub async fn listener_count(&self) -> usize {
        self.listeners.read().await.len()
    }

    /// Get shutdown signal.
    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.shutdown_signal
    }

    /// Created -> Starting.
    pub fn begin_start(&self) -> Result<(), KernelError> {
        self.transition("start", KernelState::Created, KernelState::Starting)
    }

    /// Starting -> Running.
    pub fn finish_start(&self) -> Result<(), KernelError> {
        self.transition("finish start", KernelState::Starting, KernelState::Running)
    }

    /// Running -> Stopping.
    pub fn begin_stop(&self) -> Result<(), KernelError> {
        self.transition("stop", KernelState::Running, KernelState::Stopping)
    }

    /// Stopping -> Stopped.
    pub fn finish_stop(&self) -> Result<(), KernelError> {
        self.transition("finish stop", KernelState::Stopping, KernelState::Stopped)
    }

    /// Force the terminal state after a fatal failure.
    pub fn abort(&self) {
        let previous = self.state.swap(KernelState::Stopped as u8, Ordering::SeqCst);
        debug!("Lifecycle aborted from {:?}", KernelState::from(previous));
    }

    fn transition(
        &self,
        operation: &'static str,
        from: KernelState,
        to: KernelState,
    ) -> Result<(), KernelError> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|current| KernelError::InvalidState {
                operation,
                state: format!("{:?}", KernelState::from(current)),
            })
    }

    /// Deliver `event` to every listener in order. The first failure stops
    /// delivery and is returned.
    pub async fn emit(&self, event: KernelEvent) -> Result<(), KernelError> {
        let listeners = self.listeners.read().await;
        debug!("Emitting {} to {} listeners", event, listeners.len());
        for listener in listeners.iter() {
            if let Err(e) = listener.on_event(event).await {
                error!("Listener failed on {}: {}", event, e);
                return Err(KernelError::Listener {
                    event: event.to_string(),
                    message: e.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}
