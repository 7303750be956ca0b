//! Callback and phase hook errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("Invalid capability: tag must not be empty")]
    InvalidCapability,

    #[error("Callback invocation failed: {0}")]
    InvocationFailed(String),
}

#[derive(Debug, Error)]
pub enum PhaseError {
    #[error("Pre-deploy hook failed: {0}")]
    PreDeployFailed(String),

    #[error("Post-deploy hook failed: {0}")]
    PostDeployFailed(String),
}
