//! # Mycelium Core
//!
//! Deployment micro-kernel implementation.
//!
//! ## Components
//!
//! - [`Kernel`] - Lifecycle controller driving startup and shutdown
//! - [`BeanRegistry`] - Named beans, their status and dependants
//! - [`CallbackDispatcher`] - Capability keyed on-add/on-remove callbacks
//! - [`DeployerPhaseCoordinator`] - Pre/post deploy notification of a wave
//! - [`DeploymentOrchestrator`] - Fans units out over the [`WorkerPool`] and
//!   joins them before callbacks are dispatched
//!
//! ## Deployment waves
//!
//! Units are deployed in batches. Every unit of a batch is activated through
//! its own [`DeployerHandle`]; the batch only completes once every unit has
//! settled, and only then do on-add callbacks fire.

pub mod barrier;
pub mod callback;
pub mod environment;
pub mod handle;
pub mod kernel;
pub mod lifecycle;
pub mod management;
pub mod orchestrator;
pub mod phases;
pub mod pool;
pub mod registry;

pub use barrier::{ArrivalGuard, JoinBarrier};
pub use callback::CallbackDispatcher;
pub use environment::{DirectoryEnvironmentBuilder, SearchPathEnvironment};
pub use handle::DeployerHandle;
pub use kernel::{Kernel, KernelBuilder, KERNEL_BEAN};
pub use lifecycle::{KernelState, LifecycleManager, ShutdownSignal};
pub use management::{InMemoryRegistrar, KernelInfo};
pub use orchestrator::{DeploymentOrchestrator, DeploymentRecord};
pub use phases::DeployerPhaseCoordinator;
pub use pool::WorkerPool;
pub use registry::BeanRegistry;
