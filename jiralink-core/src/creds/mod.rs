//! # Credential Management
//!
//! Lookup of the username/secret pair used to authenticate against a Jira
//! site. Credentials are keyed by the host of the site URL; the only backing
//! store shipped here is the user's `.netrc` file.

pub mod netrc;

use std::fmt;

use anyhow::Result;
use url::Url;

pub use self::netrc::NetrcCredentialStore;

/// Represents credentials for a service
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

impl Credentials {
  pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
    Self {
      username: username.into(),
      password: password.into(),
    }
  }
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credentials")
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .finish()
  }
}

/// Source of credentials for a Jira site
pub trait CredentialStore: Send + Sync {
  /// Look up credentials for the host of `url`.
  ///
  /// Returns `Ok(None)` when the store has nothing for that host, which
  /// callers treat as a request for anonymous access.
  fn lookup(&self, url: &Url) -> Result<Option<Credentials>>;
}

/// A store that never has credentials, used for anonymous-only setups
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCredentials;

impl CredentialStore for NoCredentials {
  fn lookup(&self, _url: &Url) -> Result<Option<Credentials>> {
    Ok(None)
  }
}
