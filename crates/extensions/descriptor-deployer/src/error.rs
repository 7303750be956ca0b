//! Descriptor errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Bean #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("Bean {0} is defined twice")]
    DuplicateBean(String),

    #[error("Bean {0} depends on itself")]
    SelfDependency(String),
}
