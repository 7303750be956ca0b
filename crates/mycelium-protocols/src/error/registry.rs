//! Bean registry errors.

use thiserror::Error;

use crate::bean::BeanStatus;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Bean not found: {0}")]
    NotFound(String),

    #[error("Invalid bean name: {0:?}")]
    InvalidName(String),

    #[error("Bean {name} cannot move from {from:?} back to {to:?}")]
    StatusRegression {
        name: String,
        from: BeanStatus,
        to: BeanStatus,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = RegistryError::NotFound("DataSource".to_string());
        assert!(err.to_string().contains("not found"));
        assert!(err.to_string().contains("DataSource"));
    }

    #[test]
    fn test_status_regression_error() {
        let err = RegistryError::StatusRegression {
            name: "Pool".to_string(),
            from: BeanStatus::Stopped,
            to: BeanStatus::Started,
        };
        let display = err.to_string();
        assert!(display.contains("Pool"));
        assert!(display.contains("Stopped"));
        assert!(display.contains("Started"));
    }

    #[test]
    fn test_invalid_name_error() {
        let err = RegistryError::InvalidName(String::new());
        assert!(err.to_string().contains("Invalid bean name"));
    }
}
