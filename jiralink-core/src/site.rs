//! # Jira Sites
//!
//! A [`Site`] identifies one Jira instance: where it lives, which wire
//! protocol to speak to it, and which identifiers can possibly be issue keys
//! there. Sites are configured once and shared read-only by every caller.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::url::parse_site_url;

/// Issue keys are a project prefix followed by a positive number, e.g. `MNG-1235`
pub const DEFAULT_ISSUE_PATTERN: &str = r"[A-Za-z][A-Za-z0-9_]+-[1-9][0-9]*";

/// Which wire protocol a session for this site speaks
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  /// Token-based XML-RPC interface under `rpc/xmlrpc`
  Legacy,
  /// JSON REST interface under `rest/api/2`
  #[default]
  Rest,
}

impl fmt::Display for Backend {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Backend::Legacy => f.write_str("legacy RPC"),
      Backend::Rest => f.write_str("REST"),
    }
  }
}

/// How a failed connectivity probe is treated when a session is created
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProbePolicy {
  /// Any probe failure discards the session
  #[default]
  Strict,
  /// An anonymous session whose probe is rejected for lack of credentials is
  /// kept; some servers refuse server metadata to anonymous users while still
  /// serving issues to them
  Lenient,
}

/// Errors raised while building a [`Site`] from configuration
#[derive(Debug, Error)]
pub enum SiteError {
  #[error("Invalid Jira url '{url}': {reason}")]
  InvalidUrl { url: String, reason: String },
  #[error("Invalid issue key pattern '{pattern}'")]
  InvalidPattern {
    pattern: String,
    #[source]
    source: regex::Error,
  },
  #[error("Site name cannot be empty")]
  EmptyName,
}

const fn default_true() -> bool {
  true
}

/// Serialized form of a site, as found in `sites.toml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteConfig {
  pub name: String,
  pub url: String,
  #[serde(default)]
  pub backend: Backend,
  /// Send credentials as HTTP basic auth instead of logging in for a token
  #[serde(default)]
  pub use_http_auth: bool,
  #[serde(default = "default_true")]
  pub allow_anonymous: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub issue_pattern: Option<String>,
  #[serde(default)]
  pub probe: ProbePolicy,
}

/// One configured Jira instance
#[derive(Debug, Clone)]
pub struct Site {
  name: String,
  url: Url,
  backend: Backend,
  use_http_auth: bool,
  allow_anonymous: bool,
  probe: ProbePolicy,
  issue_pattern: Regex,
}

impl Site {
  /// Create a REST site with default settings
  pub fn new(name: &str, url: &str) -> Result<Self, SiteError> {
    Self::from_config(&SiteConfig {
      name: name.to_string(),
      url: url.to_string(),
      backend: Backend::default(),
      use_http_auth: false,
      allow_anonymous: true,
      issue_pattern: None,
      probe: ProbePolicy::default(),
    })
  }

  /// Validate a configuration entry and build the site from it
  pub fn from_config(config: &SiteConfig) -> Result<Self, SiteError> {
    let name = config.name.trim();
    if name.is_empty() {
      return Err(SiteError::EmptyName);
    }

    let url = parse_site_url(&config.url)?;
    let issue_pattern = compile_issue_pattern(config.issue_pattern.as_deref().unwrap_or(DEFAULT_ISSUE_PATTERN))?;

    Ok(Self {
      name: name.to_string(),
      url,
      backend: config.backend,
      use_http_auth: config.use_http_auth,
      allow_anonymous: config.allow_anonymous,
      probe: config.probe,
      issue_pattern,
    })
  }

  pub fn with_backend(mut self, backend: Backend) -> Self {
    self.backend = backend;
    self
  }

  pub fn with_http_auth(mut self, use_http_auth: bool) -> Self {
    self.use_http_auth = use_http_auth;
    self
  }

  pub fn with_anonymous(mut self, allow_anonymous: bool) -> Self {
    self.allow_anonymous = allow_anonymous;
    self
  }

  pub fn with_probe_policy(mut self, probe: ProbePolicy) -> Self {
    self.probe = probe;
    self
  }

  pub fn with_issue_pattern(mut self, pattern: &str) -> Result<Self, SiteError> {
    self.issue_pattern = compile_issue_pattern(pattern)?;
    Ok(self)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Base URL of the Jira web application, always ending in `/`
  pub fn url(&self) -> &Url {
    &self.url
  }

  pub fn backend(&self) -> Backend {
    self.backend
  }

  pub fn use_http_auth(&self) -> bool {
    self.use_http_auth
  }

  pub fn allow_anonymous(&self) -> bool {
    self.allow_anonymous
  }

  pub fn probe_policy(&self) -> ProbePolicy {
    self.probe
  }

  /// Whether `id` could be an issue key on this site.
  ///
  /// The whole identifier must match; no request is made.
  pub fn matches_issue_key(&self, id: &str) -> bool {
    self.issue_pattern.is_match(id)
  }
}

fn compile_issue_pattern(pattern: &str) -> Result<Regex, SiteError> {
  Regex::new(&format!("^(?:{pattern})$")).map_err(|source| SiteError::InvalidPattern {
    pattern: pattern.to_string(),
    source,
  })
}
