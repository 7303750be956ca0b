//! # Mycelium Protocols
//!
//! Core protocol definitions (traits) for the Mycelium deployment kernel.
//! Contains only interface definitions and value types - no implementations.
//!
//! ## Core Traits
//!
//! - [`Bean`] - An object registered into the kernel's bean registry
//! - [`BeanCallback`] - Hook fired when a bean of a matching capability appears or goes away
//! - [`DeployerPhases`] - Opt-in pre/post deploy notification for beans
//! - [`Deployer`] - Activates one deployment unit through a [`DeployContext`]
//! - [`Teardown`] - Optional stop/destroy hooks of a deployed unit
//! - [`EventListener`] - Receives kernel lifecycle events
//! - Collaborators consumed by the kernel: [`EnvironmentBuilder`],
//!   [`ManagementRegistrar`], [`HotDeployWatcher`], [`RemoteCollaborator`],
//!   [`DescriptorSource`]

pub mod bean;
pub mod collaborator;
pub mod deployment;
pub mod error;
pub mod event;

pub use bean::{Bean, BeanCallback, BeanStatus, Capability, CallbackDirection, DeployerPhases};
pub use collaborator::{
    DescriptorSource, Environment, EnvironmentBuilder, HotDeployWatcher, Managed,
    ManagementRegistrar, RemoteAccess, RemoteCollaborator,
};
pub use deployment::{
    DeployContext, DeployReport, Deployer, DeploymentControl, Locator, Teardown,
};
pub use error::{BoxError, CallbackError, DeployError, KernelError, PhaseError, RegistryError};
pub use event::{EventListener, KernelEvent};
