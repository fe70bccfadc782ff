//! Error taxonomy shared by both session backends.
//!
//! Callers branch on the variant: [`SessionError::NotSupported`] means the
//! backend lacks the capability and retrying is pointless, while
//! [`SessionError::Connectivity`] is a transport failure that may clear up.
//! "Not found" is never an error; lookups return `Ok(None)` instead.

use jiralink_core::Backend;
use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
  /// DNS, TCP, TLS failures and HTTP 5xx answers
  #[error("Failed to reach Jira: {0}")]
  Connectivity(String),

  /// Credentials rejected, or required but missing
  #[error("Authentication failed: {0}")]
  Authentication(String),

  #[error("{operation} is not supported by the {backend} backend")]
  NotSupported { operation: &'static str, backend: Backend },

  /// Jira refused the request content
  #[error("Jira rejected the request: {0}")]
  Validation(String),

  /// Any other failure reported by the server
  #[error("Jira reported an error: {0}")]
  Remote(String),

  /// The server answered with something we could not decode
  #[error("Unexpected response from Jira: {0}")]
  Protocol(String),

  #[error("Invalid Jira url: {0}")]
  InvalidUrl(String),

  #[error("Failed to look up credentials: {0}")]
  CredentialLookup(String),

  /// A bulk fix-version update stopped at `issue`; the first `updated`
  /// issues keep their new fix versions
  #[error("Updating issue {issue} failed after {updated} issue(s) were updated")]
  BulkUpdate {
    issue: String,
    updated: usize,
    #[source]
    source: Box<SessionError>,
  },
}

impl SessionError {
  pub const fn not_supported(backend: Backend, operation: &'static str) -> Self {
    Self::NotSupported { operation, backend }
  }

  /// Whether the backend lacks the capability, as opposed to a failed call
  pub const fn is_not_supported(&self) -> bool {
    matches!(self, Self::NotSupported { .. })
  }

  /// Failures a session factory reports as "no session" instead of an error
  pub const fn is_expected_connect_failure(&self) -> bool {
    matches!(
      self,
      Self::InvalidUrl(_) | Self::Authentication(_) | Self::Connectivity(_)
    )
  }

  pub(crate) fn from_transport(context: &str, err: reqwest::Error) -> Self {
    if err.is_builder() {
      Self::InvalidUrl(format!("{context}: {err}"))
    } else if err.is_decode() {
      Self::Protocol(format!("{context}: {err}"))
    } else {
      Self::Connectivity(format!("{context}: {err}"))
    }
  }

  pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
    match status {
      StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Authentication(format!(
        "HTTP {status}. Please check your Jira credentials."
      )),
      StatusCode::BAD_REQUEST => Self::Validation(format!("HTTP {status} - {}", body.trim())),
      s if s.is_server_error() => Self::Connectivity(format!("HTTP {status}")),
      _ => Self::Remote(format!("HTTP {status} - {}", body.trim())),
    }
  }

  pub(crate) fn protocol(err: impl std::fmt::Display) -> Self {
    Self::Protocol(err.to_string())
  }
}
