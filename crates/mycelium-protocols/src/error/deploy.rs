//! Deployment unit errors.

use thiserror::Error;

use super::{CallbackError, RegistryError};

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Activation of {locator} failed: {message}")]
    ActivationFailed { locator: String, message: String },

    #[error("Invalid descriptor {locator}: {message}")]
    InvalidDescriptor { locator: String, message: String },

    #[error("Unit {0} could not be scheduled: worker pool is not running")]
    Rejected(String),

    #[error("Unit {0} panicked during activation")]
    Panicked(String),

    #[error("Unit {locator} did not settle within {secs:.3}s")]
    TimedOut { locator: String, secs: f64 },

    #[error("Teardown of {locator} failed: {message}")]
    TeardownFailed { locator: String, message: String },

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Callback error: {0}")]
    Callback(#[from] CallbackError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Custom(String),
}

impl DeployError {
    pub fn activation(locator: impl ToString, message: impl ToString) -> Self {
        Self::ActivationFailed {
            locator: locator.to_string(),
            message: message.to_string(),
        }
    }

    pub fn teardown(locator: impl ToString, message: impl ToString) -> Self {
        Self::TeardownFailed {
            locator: locator.to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_failed_error() {
        let err = DeployError::activation("deploy/a.toml", "bad bean");
        let display = err.to_string();
        assert!(display.contains("deploy/a.toml"));
        assert!(display.contains("bad bean"));
    }

    #[test]
    fn test_registry_error_from() {
        let err = DeployError::from(RegistryError::NotFound("X".to_string()));
        assert!(matches!(err, DeployError::Registry(_)));
        assert!(err.to_string().contains("X"));
    }

    #[test]
    fn test_all_error_variants_display() {
        let errors: Vec<DeployError> = vec![
            DeployError::activation("a", "b"),
            DeployError::InvalidDescriptor {
                locator: "c".to_string(),
                message: "d".to_string(),
            },
            DeployError::Rejected("e".to_string()),
            DeployError::Panicked("f".to_string()),
            DeployError::teardown("g", "h"),
            DeployError::Custom("i".to_string()),
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
