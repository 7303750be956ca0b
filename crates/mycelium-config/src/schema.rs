//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root kernel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Kernel name; also names the temporary root directory.
    #[serde(default = "default_name")]
    pub name: String,

    /// Root directory. A temporary one is created (and removed at
    /// shutdown) when unset.
    #[serde(default)]
    pub home: Option<PathBuf>,

    /// Library directory, relative to `home`. Search path only.
    #[serde(default = "default_library")]
    pub library: Option<String>,

    /// Config directory, relative to `home`. Search path and bootstrap
    /// descriptor location.
    #[serde(default = "default_configuration")]
    pub configuration: Option<String>,

    /// System directory, relative to `home`. Scanned for units.
    #[serde(default = "default_system")]
    pub system: Option<String>,

    /// User deploy directory, relative to `home`. Scanned for units.
    #[serde(default = "default_deploy")]
    pub deploy: Option<String>,

    /// Files ending with this suffix count as unit descriptors.
    #[serde(default = "default_descriptor_suffix")]
    pub descriptor_suffix: String,

    #[serde(default = "default_true")]
    pub parallel_deploy: bool,

    #[serde(default)]
    pub hot_deployment: bool,

    #[serde(default = "default_hot_deployment_interval")]
    pub hot_deployment_interval_secs: u64,

    #[serde(default)]
    pub remote_access: bool,

    #[serde(default)]
    pub bind_address: Option<String>,

    #[serde(default = "default_remote_port")]
    pub remote_port: u16,

    /// Upper bound for one parallel batch. Unbounded when unset.
    #[serde(default)]
    pub deploy_timeout_secs: Option<u64>,

    #[serde(default)]
    pub pool: PoolConfig,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            home: None,
            library: default_library(),
            configuration: default_configuration(),
            system: default_system(),
            deploy: default_deploy(),
            descriptor_suffix: default_descriptor_suffix(),
            parallel_deploy: true,
            hot_deployment: false,
            hot_deployment_interval_secs: default_hot_deployment_interval(),
            remote_access: false,
            bind_address: None,
            remote_port: default_remote_port(),
            deploy_timeout_secs: None,
            pool: PoolConfig::default(),
        }
    }
}

impl KernelConfig {
    pub fn library_dir(&self, root: &Path) -> Option<PathBuf> {
        resolve(root, self.library.as_deref())
    }

    pub fn config_dir(&self, root: &Path) -> Option<PathBuf> {
        resolve(root, self.configuration.as_deref())
    }

    pub fn system_dir(&self, root: &Path) -> Option<PathBuf> {
        resolve(root, self.system.as_deref())
    }

    pub fn deploy_dir(&self, root: &Path) -> Option<PathBuf> {
        resolve(root, self.deploy.as_deref())
    }

    pub fn deploy_timeout(&self) -> Option<Duration> {
        self.deploy_timeout_secs.map(Duration::from_secs)
    }

    pub fn hot_deployment_interval(&self) -> Duration {
        Duration::from_secs(self.hot_deployment_interval_secs)
    }
}

fn resolve(root: &Path, dir: Option<&str>) -> Option<PathBuf> {
    dir.filter(|d| !d.is_empty()).map(|d| root.join(d))
}

/// Worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Core worker threads. Defaults to the available parallelism.
    #[serde(default)]
    pub core_workers: Option<usize>,

    /// Idle threads are reaped after this many seconds.
    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            core_workers: None,
            keep_alive_secs: default_keep_alive(),
        }
    }
}

impl PoolConfig {
    pub fn workers(&self) -> usize {
        self.core_workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

fn default_name() -> String {
    "mycelium".to_string()
}

fn default_library() -> Option<String> {
    Some("lib".to_string())
}

fn default_configuration() -> Option<String> {
    Some("config".to_string())
}

fn default_system() -> Option<String> {
    Some("system".to_string())
}

fn default_deploy() -> Option<String> {
    Some("deploy".to_string())
}

fn default_descriptor_suffix() -> String {
    ".toml".to_string()
}

fn default_true() -> bool {
    true
}

fn default_hot_deployment_interval() -> u64 {
    5
}

fn default_remote_port() -> u16 {
    1202
}

fn default_keep_alive() -> u64 {
    60
}
