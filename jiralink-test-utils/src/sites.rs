//! Temporary site configuration files for tests

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// RAII guard holding a `sites.toml` file inside a temporary config directory
pub struct SitesFileGuard {
  temp_dir: TempDir,
  path: PathBuf,
}

impl SitesFileGuard {
  /// Write `content` to `<tmp>/sites.toml`
  pub fn new(content: &str) -> Self {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("sites.toml");
    fs::write(&path, content).expect("Failed to write test sites.toml");
    Self { temp_dir, path }
  }

  /// A config directory with no `sites.toml` in it
  pub fn missing() -> Self {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("sites.toml");
    Self { temp_dir, path }
  }

  /// Path to the `sites.toml` file
  pub fn path(&self) -> &Path {
    &self.path
  }
}
