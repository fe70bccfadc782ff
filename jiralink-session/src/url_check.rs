//! Check that a URL points at a Jira instance with the legacy remote API
//! enabled, before saving it as a legacy site.

use std::fmt;

use jiralink_core::url::parse_site_url;
use reqwest::Client;
use tracing::warn;
use url::Url;

use crate::consts::{LEGACY_WSDL_PATH, USER_AGENT};

/// Outcome of [`check_legacy_url`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlCheck {
  Ok,
  /// No URL was given
  Missing,
  /// The page does not look like a Jira instance
  NotJira,
  /// Jira answered but its legacy remote API is switched off
  NoLegacyService,
  Unreachable(String),
}

impl UrlCheck {
  pub fn is_ok(&self) -> bool {
    *self == UrlCheck::Ok
  }
}

impl fmt::Display for UrlCheck {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      UrlCheck::Ok => f.write_str("Jira with the legacy remote API"),
      UrlCheck::Missing => f.write_str("Jira URL is mandatory"),
      UrlCheck::NotJira => f.write_str("This is a valid URL but it doesn't look like Jira"),
      UrlCheck::NoLegacyService => f.write_str("The legacy remote API is not enabled on this Jira"),
      UrlCheck::Unreachable(reason) => write!(f, "Unable to connect: {reason}"),
    }
  }
}

/// Probe the front page and the legacy service description of `url`
pub async fn check_legacy_url(url: Option<&str>) -> UrlCheck {
  let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
    return UrlCheck::Missing;
  };

  let base = match parse_site_url(url) {
    Ok(base) => base,
    Err(e) => return UrlCheck::Unreachable(e.to_string()),
  };

  let client = Client::new();

  match fetch_text(&client, base.clone()).await {
    Ok(page) if page.contains("Atlassian JIRA") => {}
    Ok(_) => return UrlCheck::NotJira,
    Err(reason) => {
      warn!("Unable to connect to {base}: {reason}");
      return UrlCheck::Unreachable(reason);
    }
  }

  let wsdl = match base.join(LEGACY_WSDL_PATH) {
    Ok(wsdl) => wsdl,
    Err(e) => return UrlCheck::Unreachable(e.to_string()),
  };
  match fetch_text(&client, wsdl).await {
    Ok(description) if description.contains("wsdl:definitions") => UrlCheck::Ok,
    Ok(_) => UrlCheck::NoLegacyService,
    Err(reason) => {
      warn!("Unable to connect to {base}: {reason}");
      UrlCheck::Unreachable(reason)
    }
  }
}

async fn fetch_text(client: &Client, url: Url) -> Result<String, String> {
  let response = client
    .get(url)
    .header(reqwest::header::USER_AGENT, USER_AGENT)
    .send()
    .await
    .and_then(reqwest::Response::error_for_status)
    .map_err(|e| e.to_string())?;
  response.text().await.map_err(|e| e.to_string())
}
