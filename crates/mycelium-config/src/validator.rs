//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::KernelConfig;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::Invalid {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &KernelConfig) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_identity(config, &mut result);
        Self::validate_directories(config, &mut result);
        Self::validate_deployment(config, &mut result);
        Self::validate_remote(config, &mut result);
        Self::validate_pool(config, &mut result);

        Ok(result)
    }

    fn validate_identity(config: &KernelConfig, result: &mut ValidationResult) {
        if config.name.trim().is_empty() {
            result.add_error(ValidationError::new("name", "Kernel name cannot be empty"));
        }

        if config.name.contains(['/', '\\']) {
            result.add_error(ValidationError::new(
                "name",
                "Kernel name cannot contain path separators",
            ));
        }
    }

    fn validate_directories(config: &KernelConfig, result: &mut ValidationResult) {
        match &config.home {
            Some(home) if !home.exists() => {
                result.add_warning(ValidationWarning::new(
                    "home",
                    format!("Home directory does not exist: {:?}", home),
                ));
            }
            None => {
                result.add_warning(ValidationWarning::new(
                    "home",
                    "No home configured, a temporary root will be created and removed at shutdown",
                ));
            }
            _ => {}
        }

        if config.system.is_some() && config.system == config.deploy {
            result.add_error(ValidationError::new(
                "deploy",
                "System and deploy directories must differ",
            ));
        }
    }

    fn validate_deployment(config: &KernelConfig, result: &mut ValidationResult) {
        if config.descriptor_suffix.is_empty() {
            result.add_error(ValidationError::new(
                "descriptor_suffix",
                "Descriptor suffix cannot be empty",
            ));
        }

        if config.hot_deployment && config.hot_deployment_interval_secs == 0 {
            result.add_error(ValidationError::new(
                "hot_deployment_interval_secs",
                "Hot deployment interval must be greater than 0",
            ));
        }

        if config.deploy_timeout_secs == Some(0) {
            result.add_error(ValidationError::new(
                "deploy_timeout_secs",
                "Deploy timeout must be greater than 0 when set",
            ));
        }
    }

    fn validate_remote(config: &KernelConfig, result: &mut ValidationResult) {
        if config.remote_access && config.remote_port == 0 {
            result.add_error(ValidationError::new(
                "remote_port",
                "Port cannot be 0 when remote access is enabled",
            ));
        }

        if let Some(address) = &config.bind_address {
            if address.trim().is_empty() {
                result.add_error(ValidationError::new(
                    "bind_address",
                    "Bind address cannot be blank",
                ));
            }
        }
    }

    fn validate_pool(config: &KernelConfig, result: &mut ValidationResult) {
        if config.pool.core_workers == Some(0) {
            result.add_error(ValidationError::new(
                "pool.core_workers",
                "core_workers must be greater than 0",
            ));
        }

        if config.pool.keep_alive_secs == 0 {
            result.add_warning(ValidationWarning::new(
                "pool.keep_alive_secs",
                "keep_alive_secs is 0, idle workers will be reaped immediately",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
