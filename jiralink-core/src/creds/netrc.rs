//! Credential lookup backed by a `.netrc` file.
//!
//! Entries are matched by machine name against the host of the Jira site URL.
//! Both the single-line (`machine host login user password pass`) and the
//! multi-line layouts are accepted, and a trailing `default` entry is used
//! when no machine matches.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use tracing::{debug, warn};
use url::Url;

use crate::creds::{CredentialStore, Credentials};

/// Returns the path to the `.netrc` file for the provided home directory.
///
/// ```
/// use std::path::Path;
/// use jiralink_core::creds::netrc::get_netrc_path;
///
/// let path = get_netrc_path(Path::new("/home/ci"));
/// assert_eq!(path, Path::new("/home/ci/.netrc"));
/// ```
pub fn get_netrc_path(home: &Path) -> PathBuf {
  home.join(".netrc")
}

#[derive(Default)]
struct Entry {
  machine: Option<String>,
  login: Option<String>,
  password: Option<String>,
}

impl Entry {
  fn into_credentials(self) -> Option<Credentials> {
    match (self.login, self.password) {
      (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
        Some(Credentials { username, password })
      }
      _ => None,
    }
  }
}

/// Parses `.netrc` content and returns credentials for `target_machine`.
///
/// Returns `None` when the machine is absent or its entry lacks a login or a
/// password. A `default` entry only applies if no machine entry matched.
pub fn parse_netrc(content: &str, target_machine: &str) -> Option<Credentials> {
  let mut entries: Vec<Entry> = Vec::new();
  let mut tokens = content.split_whitespace();

  while let Some(token) = tokens.next() {
    match token {
      "machine" => entries.push(Entry {
        machine: tokens.next().map(str::to_string),
        ..Entry::default()
      }),
      "default" => entries.push(Entry::default()),
      "login" => {
        if let (Some(entry), Some(value)) = (entries.last_mut(), tokens.next()) {
          entry.login = Some(value.to_string());
        }
      }
      "password" => {
        if let (Some(entry), Some(value)) = (entries.last_mut(), tokens.next()) {
          entry.password = Some(value.to_string());
        }
      }
      _ => {}
    }
  }

  let mut fallback = None;
  for entry in entries {
    match entry.machine.as_deref() {
      Some(machine) if machine.eq_ignore_ascii_case(target_machine) => return entry.into_credentials(),
      Some(_) => {}
      None => fallback = Some(entry),
    }
  }
  fallback.and_then(Entry::into_credentials)
}

/// Reads the `.netrc` file at `path` and looks up `target_machine`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn parse_netrc_file(path: &Path, target_machine: &str) -> Result<Option<Credentials>> {
  let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  Ok(parse_netrc(&content, target_machine))
}

/// Credential store reading `<home>/.netrc`
#[derive(Debug, Clone)]
pub struct NetrcCredentialStore {
  home: PathBuf,
}

impl NetrcCredentialStore {
  pub fn new(home: impl Into<PathBuf>) -> Self {
    Self { home: home.into() }
  }

  /// Store for the current user's home directory
  pub fn from_home() -> Result<Self> {
    let base_dirs = BaseDirs::new().context("Failed to determine home directory")?;
    Ok(Self::new(base_dirs.home_dir()))
  }

  pub fn netrc_path(&self) -> PathBuf {
    get_netrc_path(&self.home)
  }
}

impl CredentialStore for NetrcCredentialStore {
  fn lookup(&self, url: &Url) -> Result<Option<Credentials>> {
    let Some(host) = url.host_str() else {
      warn!("Jira url {url} has no host, cannot look up credentials");
      return Ok(None);
    };

    let path = self.netrc_path();
    if !path.exists() {
      debug!("No .netrc at {}, using anonymous access for {host}", path.display());
      return Ok(None);
    }

    let credentials = parse_netrc_file(&path, host)?;
    if credentials.is_none() {
      warn!("Found no credentials matching Jira url {url}");
    }
    Ok(credentials)
  }
}
