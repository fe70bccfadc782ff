//! # Configuration Management
//!
//! Locates the jiralink configuration directory and reads the list of
//! configured Jira sites from `sites.toml`:
//!
//! ```toml
//! [[sites]]
//! name = "apache"
//! url = "https://issues.apache.org/jira/"
//! backend = "rest"
//!
//! [[sites]]
//! name = "legacy"
//! url = "http://jira.internal:8080/"
//! backend = "legacy"
//! use_http_auth = false
//! issue_pattern = "[A-Z]+-[0-9]+"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::site::{Site, SiteConfig};

/// Contents of `sites.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SitesFile {
  #[serde(default)]
  pub sites: Vec<SiteConfig>,
}

impl SitesFile {
  /// Validate every entry, in file order
  pub fn build_sites(&self) -> Result<Vec<Site>> {
    self
      .sites
      .iter()
      .map(|config| Site::from_config(config).with_context(|| format!("Invalid site '{}'", config.name)))
      .collect()
  }
}

/// Load `sites.toml` from an explicit path; a missing file yields no sites
pub fn load_sites_from(path: &Path) -> Result<SitesFile> {
  if !path.exists() {
    debug!("No site configuration at {}", path.display());
    return Ok(SitesFile::default());
  }

  let content =
    fs::read_to_string(path).with_context(|| format!("Failed to read site config from {}", path.display()))?;
  toml::from_str(&content).with_context(|| format!("Failed to parse site config from {}", path.display()))
}

/// Represents the configuration directory for jiralink
#[derive(Debug, Clone)]
pub struct ConfigDirs {
  pub config_dir: PathBuf,
}

impl ConfigDirs {
  /// Platform configuration directory, e.g. `~/.config/jiralink` on Linux
  pub fn new() -> Result<Self> {
    let proj_dirs =
      ProjectDirs::from("eddieland", "", "jiralink").context("Failed to determine project directories")?;

    Ok(Self {
      config_dir: proj_dirs.config_dir().to_path_buf(),
    })
  }

  /// Get the path to the site configuration file
  pub fn sites_path(&self) -> PathBuf {
    self.config_dir.join("sites.toml")
  }
}

/// Write `sites` to `path`, creating parent directories as needed
pub fn save_sites_to(path: &Path, sites: &SitesFile) -> Result<()> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)
      .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
  }

  let content = toml::to_string_pretty(sites).context("Failed to serialize site config")?;
  fs::write(path, content).with_context(|| format!("Failed to write site config to {}", path.display()))?;

  Ok(())
}

#[cfg(test)]
mod tests {
  use jiralink_test_utils::SitesFileGuard;
  use tempfile::TempDir;

  use super::*;
  use crate::site::Backend;

  #[test]
  fn test_load_sites_keeps_file_order() {
    let guard = SitesFileGuard::new(
      r#"
[[sites]]
name = "first"
url = "https://first.example.com/"

[[sites]]
name = "second"
url = "http://second.example.com:8080"
backend = "legacy"
"#,
    );

    let sites = load_sites_from(guard.path()).unwrap().build_sites().unwrap();
    assert_eq!(sites.len(), 2);
    assert_eq!(sites[0].name(), "first");
    assert_eq!(sites[1].name(), "second");
    assert_eq!(sites[1].backend(), Backend::Legacy);
  }

  #[test]
  fn test_missing_file_yields_no_sites() {
    let guard = SitesFileGuard::missing();
    let sites = load_sites_from(guard.path()).unwrap();
    assert!(sites.sites.is_empty());
  }

  #[test]
  fn test_invalid_site_names_the_entry() {
    let guard = SitesFileGuard::new(
      r#"
[[sites]]
name = "broken"
url = "ftp://nope"
"#,
    );

    let err = load_sites_from(guard.path()).unwrap().build_sites().unwrap_err();
    assert!(err.to_string().contains("broken"));
  }

  #[test]
  fn test_save_and_reload_sites() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("sites.toml");

    let file = SitesFile {
      sites: vec![SiteConfig {
        name: "example".to_string(),
        url: "https://jira.example.com/".to_string(),
        backend: Backend::Legacy,
        use_http_auth: true,
        allow_anonymous: false,
        issue_pattern: Some("[A-Z]+-[0-9]+".to_string()),
        probe: Default::default(),
      }],
    };

    save_sites_to(&path, &file).unwrap();
    assert_eq!(load_sites_from(&path).unwrap(), file);
  }
}
