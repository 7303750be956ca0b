//! # Mycelium Config
//!
//! Configuration management for the Mycelium kernel.

mod bootstrap;
mod error;
mod loader;
mod schema;
mod validator;

pub use bootstrap::{BootstrapDescriptor, TomlDescriptorSource, BOOTSTRAP_FILE};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
