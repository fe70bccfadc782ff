//! URL helpers for Jira site addresses.
//!
//! Site URLs are stored as the base of the Jira web application and always
//! end in `/`, so that relative endpoint paths such as `rest/api/2/project`
//! join underneath the base instead of replacing its last segment.

use url::Url;

use crate::site::SiteError;

/// Parse a configured site address into a base URL.
///
/// A missing scheme is assumed to be `https://`. Only `http` and `https` are
/// accepted, and the returned URL always ends in `/`.
pub fn parse_site_url(input: &str) -> Result<Url, SiteError> {
  let trimmed = input.trim();
  if trimmed.is_empty() {
    return Err(SiteError::InvalidUrl {
      url: input.to_string(),
      reason: "host cannot be empty".to_string(),
    });
  }

  let lowered = trimmed.to_ascii_lowercase();
  let candidate = if lowered.starts_with("http://") || lowered.starts_with("https://") {
    trimmed.to_string()
  } else if lowered.contains("://") {
    return Err(SiteError::InvalidUrl {
      url: input.to_string(),
      reason: "only http and https are supported".to_string(),
    });
  } else {
    format!("https://{trimmed}")
  };

  let mut url = Url::parse(&candidate).map_err(|e| SiteError::InvalidUrl {
    url: input.to_string(),
    reason: e.to_string(),
  })?;

  if url.host_str().is_none_or(str::is_empty) {
    return Err(SiteError::InvalidUrl {
      url: input.to_string(),
      reason: "missing host".to_string(),
    });
  }

  if !url.path().ends_with('/') {
    let path = format!("{}/", url.path());
    url.set_path(&path);
  }
  url.set_query(None);
  url.set_fragment(None);

  Ok(url)
}
