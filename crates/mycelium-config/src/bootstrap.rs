//! Bootstrap descriptor (`bootstrap.toml` in the config directory).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use mycelium_protocols::{BoxError, DescriptorSource};

use crate::error::ConfigError;

/// File name of the bootstrap descriptor inside the config directory.
pub const BOOTSTRAP_FILE: &str = "bootstrap.toml";

/// Ordered list of units to activate before anything else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapDescriptor {
    #[serde(default)]
    pub units: Vec<String>,
}

impl BootstrapDescriptor {
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read `bootstrap.toml` from `config_dir`, if there is one.
    pub fn load(config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let path = config_dir.join(BOOTSTRAP_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Self::parse(&content).map(Some)
    }
}

/// [`DescriptorSource`] backed by [`BootstrapDescriptor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlDescriptorSource;

impl DescriptorSource for TomlDescriptorSource {
    fn bootstrap_locators(&self, config_dir: &Path) -> Result<Option<Vec<String>>, BoxError> {
        Ok(BootstrapDescriptor::load(config_dir)?.map(|d| d.units))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let descriptor = BootstrapDescriptor::parse(r#"units = ["naming.toml", "pool.toml"]"#).unwrap();
        assert_eq!(descriptor.units, vec!["naming.toml", "pool.toml"]);
    }

    #[test]
    fn test_parse_empty() {
        assert!(BootstrapDescriptor::parse("").unwrap().units.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(BootstrapDescriptor::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_source_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(BOOTSTRAP_FILE), r#"units = ["a.toml"]"#).unwrap();

        let locators = TomlDescriptorSource
            .bootstrap_locators(dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(locators, vec!["a.toml".to_string()]);
    }

    #[test]
    fn test_source_propagates_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(BOOTSTRAP_FILE), "units = [").unwrap();
        assert!(TomlDescriptorSource.bootstrap_locators(dir.path()).is_err());
    }
}
