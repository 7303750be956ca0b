//! Unit descriptor format.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;

/// One TOML unit descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitDescriptor {
    #[serde(default, rename = "bean")]
    pub beans: Vec<BeanDefinition>,
}

/// A `[[bean]]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeanDefinition {
    pub name: String,

    /// Beans this one depends on.
    #[serde(default)]
    pub depends: Vec<String>,

    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Receive the pre/post deploy notifications of the wave.
    #[serde(default)]
    pub phased: bool,

    #[serde(default)]
    pub properties: BTreeMap<String, toml::Value>,
}

impl UnitDescriptor {
    /// Parse and validate a descriptor.
    pub fn parse(content: &str) -> Result<Self, DescriptorError> {
        let descriptor: Self = toml::from_str(content)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    fn validate(&self) -> Result<(), DescriptorError> {
        let mut seen = HashSet::new();
        for (index, bean) in self.beans.iter().enumerate() {
            if bean.name.trim().is_empty() {
                return Err(DescriptorError::EmptyName { index });
            }
            if !seen.insert(bean.name.as_str()) {
                return Err(DescriptorError::DuplicateBean(bean.name.clone()));
            }
            if bean.depends.iter().any(|d| d == &bean.name) {
                return Err(DescriptorError::SelfDependency(bean.name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
