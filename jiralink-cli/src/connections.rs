//! # Site Connections
//!
//! Builds [`SiteConnection`]s from the configured sites, with credentials
//! from the user's `.netrc`, and the runtime the commands drive them on.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use jiralink_core::creds::NetrcCredentialStore;
use jiralink_core::{ConfigDirs, CredentialStore, load_sites_from};
use jiralink_session::SiteConnection;
use tokio::runtime::Runtime;
use tracing::debug;

/// Path of `sites.toml`: the `--config` override, else the platform config
/// directory
pub fn sites_path(config_override: Option<&Path>) -> Result<PathBuf> {
  match config_override {
    Some(path) => Ok(path.to_path_buf()),
    None => Ok(ConfigDirs::new()?.sites_path()),
  }
}

/// One connection per configured site, in file order
pub fn load_connections(sites_path: &Path, credentials: Arc<dyn CredentialStore>) -> Result<Vec<Arc<SiteConnection>>> {
  let sites = load_sites_from(sites_path)?.build_sites()?;
  debug!("Loaded {} site(s) from {}", sites.len(), sites_path.display());

  Ok(
    sites
      .into_iter()
      .map(|site| Arc::new(SiteConnection::new(site, Arc::clone(&credentials))))
      .collect(),
  )
}

/// Connections for the configured sites, authenticated from `~/.netrc`
pub fn load_connections_from_netrc(config_override: Option<&Path>) -> Result<Vec<Arc<SiteConnection>>> {
  let store = NetrcCredentialStore::from_home().context("Failed to locate .netrc")?;
  load_connections(&sites_path(config_override)?, Arc::new(store))
}

/// The site named `name`, or the first configured site
pub fn select_connection(connections: &[Arc<SiteConnection>], name: Option<&str>) -> Result<Arc<SiteConnection>> {
  let selected = match name {
    Some(name) => connections.iter().find(|c| c.site().name() == name),
    None => connections.first(),
  };

  match (selected, name) {
    (Some(connection), _) => Ok(Arc::clone(connection)),
    (None, Some(name)) => bail!("No Jira site named '{name}' is configured"),
    (None, None) => bail!("No Jira sites configured. Add one with 'jiralink sites add'"),
  }
}

/// Creates the tokio runtime the commands block on
pub fn create_runtime() -> Result<Runtime> {
  Runtime::new().context("Failed to create async runtime")
}
