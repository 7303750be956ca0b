//! Kernel (lifecycle controller) errors.

use std::path::PathBuf;

use thiserror::Error;

use super::{DeployError, RegistryError};

#[derive(Debug, Error)]
pub enum KernelError {
    #[error("Cannot {operation} from state: {state}")]
    InvalidState { operation: &'static str, state: String },

    #[error("Environment error: {0}")]
    Environment(String),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Management registrar error: {0}")]
    Registrar(String),

    #[error("Worker pool is not running")]
    PoolNotRunning,

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Event listener failed on {event}: {message}")]
    Listener { event: String, message: String },

    #[error("Deployment {locator} failed to tear down: {source}")]
    Teardown {
        locator: String,
        #[source]
        source: DeployError,
    },

    #[error("Deployment not found: {0}")]
    NotDeployed(String),

    #[error("Collaborator error: {0}")]
    Collaborator(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl KernelError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
