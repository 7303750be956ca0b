//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No kernel configuration at {}", .0.display())]
    NotFound(PathBuf),

    /// First error reported by the validator.
    #[error("Invalid configuration: {field}: {message}")]
    Invalid { field: String, message: String },

    #[error("${{{0}}} is referenced but not set")]
    UnsetVariable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed TOML: {0}")]
    Parse(#[from] toml::de::Error),
}
