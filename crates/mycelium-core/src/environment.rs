//! Root directory handling and the default search path environment.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use mycelium_config::KernelConfig;
use mycelium_protocols::{BoxError, Environment, EnvironmentBuilder, KernelError, Locator};

/// Search path made of directories and the files directly inside them.
#[derive(Debug, Default)]
pub struct SearchPathEnvironment {
    entries: RwLock<Vec<PathBuf>>,
}

impl SearchPathEnvironment {
    pub fn new(entries: Vec<PathBuf>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }
}

impl Environment for SearchPathEnvironment {
    fn search_path(&self) -> Vec<PathBuf> {
        self.entries.read().clone()
    }

    fn extend(&self, entries: &[PathBuf]) {
        let mut current = self.entries.write();
        for entry in entries {
            if !current.contains(entry) {
                current.push(entry.clone());
            }
        }
    }

    fn teardown(&self) -> Result<(), BoxError> {
        self.entries.write().clear();
        Ok(())
    }
}

/// Builds a [`SearchPathEnvironment`] from each existing root directory
/// followed by its files in name order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryEnvironmentBuilder;

impl EnvironmentBuilder for DirectoryEnvironmentBuilder {
    fn build(&self, roots: &[PathBuf]) -> Result<Arc<dyn Environment>, BoxError> {
        let mut entries = Vec::new();
        for root in roots.iter().filter(|r| r.is_dir()) {
            entries.push(root.clone());
            entries.extend(list_files(root)?);
        }
        debug!("Built search path with {} entries", entries.len());
        Ok(Arc::new(SearchPathEnvironment::new(entries)))
    }
}

/// The directory every relative kernel directory is resolved against.
#[derive(Debug)]
pub(crate) struct RootDirectory {
    path: PathBuf,
    temporary: bool,
}

impl RootDirectory {
    /// Use the configured home, or recreate `<tmp>/<name>` from scratch.
    pub(crate) fn resolve(config: &KernelConfig) -> Result<Self, KernelError> {
        if let Some(home) = &config.home {
            return Ok(Self {
                path: home.clone(),
                temporary: false,
            });
        }

        let path = std::env::temp_dir().join(&config.name);
        if path.exists() {
            fs::remove_dir_all(&path).map_err(|e| KernelError::io(&path, e))?;
        }
        fs::create_dir_all(&path).map_err(|e| KernelError::io(&path, e))?;
        info!("Using temporary root {}", path.display());
        Ok(Self {
            path,
            temporary: true,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn is_temporary(&self) -> bool {
        self.temporary
    }

    /// Delete the root if it was created by the kernel.
    pub(crate) fn cleanup(&self) -> Result<(), KernelError> {
        if self.temporary && self.path.exists() {
            fs::remove_dir_all(&self.path).map_err(|e| KernelError::io(&self.path, e))?;
            debug!("Removed temporary root {}", self.path.display());
        }
        Ok(())
    }
}

/// Units found in one deployment directory.
#[derive(Debug, Default)]
pub(crate) struct ScannedUnits {
    /// Every file, in name order.
    pub(crate) locators: Vec<Locator>,
    /// Number of files carrying the descriptor suffix.
    pub(crate) descriptors: usize,
    /// Files without the descriptor suffix.
    pub(crate) others: Vec<PathBuf>,
}

pub(crate) fn scan_units(dir: &Path, suffix: &str) -> Result<ScannedUnits, KernelError> {
    let mut scanned = ScannedUnits::default();
    if !dir.is_dir() {
        return Ok(scanned);
    }

    for path in list_files(dir).map_err(|e| KernelError::io(dir, e))? {
        let locator = Locator::from_path(&path);
        if locator.has_suffix(suffix) {
            scanned.descriptors += 1;
        } else {
            scanned.others.push(path);
        }
        scanned.locators.push(locator);
    }
    scanned.locators.sort();
    Ok(scanned)
}

fn list_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_lists_dirs_then_files() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("lib");
        fs::create_dir(&lib).unwrap();
        fs::write(lib.join("b.jar"), "").unwrap();
        fs::write(lib.join("a.jar"), "").unwrap();
        let missing = dir.path().join("config");

        let env = DirectoryEnvironmentBuilder.build(&[lib.clone(), missing]).unwrap();

        assert_eq!(
            env.search_path(),
            vec![lib.clone(), lib.join("a.jar"), lib.join("b.jar")]
        );
    }

    #[test]
    fn test_extend_and_teardown() {
        let env = SearchPathEnvironment::new(vec![PathBuf::from("/a")]);
        env.extend(&[PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(env.search_path().len(), 2);

        env.teardown().unwrap();
        assert!(env.search_path().is_empty());
    }

    #[test]
    fn test_configured_home_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let config = KernelConfig {
            home: Some(dir.path().to_path_buf()),
            ..Default::default()
        };

        let root = RootDirectory::resolve(&config).unwrap();
        assert!(!root.is_temporary());
        root.cleanup().unwrap();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_temporary_root_recreated_and_removed() {
        let config = KernelConfig {
            name: format!("mycelium-env-test-{}", std::process::id()),
            ..Default::default()
        };
        let stale = std::env::temp_dir().join(&config.name);
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("leftover"), "x").unwrap();

        let root = RootDirectory::resolve(&config).unwrap();
        assert!(root.is_temporary());
        assert!(!root.path().join("leftover").exists());

        root.cleanup().unwrap();
        assert!(!root.path().exists());
    }

    #[test]
    fn test_scan_counts_descriptors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.toml"), "").unwrap();
        fs::write(dir.path().join("a.toml"), "").unwrap();
        fs::write(dir.path().join("native.so"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let scanned = scan_units(dir.path(), ".toml").unwrap();

        assert_eq!(scanned.descriptors, 2);
        assert_eq!(scanned.locators.len(), 3);
        assert_eq!(scanned.locators[0].file_name(), "a.toml");
        assert_eq!(scanned.others, vec![dir.path().join("native.so")]);
    }

    #[test]
    fn test_scan_missing_dir() {
        let scanned = scan_units(Path::new("/definitely/not/here"), ".toml").unwrap();
        assert!(scanned.locators.is_empty());
    }
}
