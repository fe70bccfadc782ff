use reqwest::{Client, StatusCode, header};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::consts::{REST_API_PATH, USER_AGENT};
use crate::error::{Result, SessionError};
use crate::models::JiraAuth;

/// Represents a REST v2 API client, shared by a session and its deferred
/// calls
pub struct RestClient {
  client: Client,
  api_root: Url,
  /// Anonymous when `None`
  auth: Option<JiraAuth>,
}

impl RestClient {
  /// Create a new client for the site rooted at `site_url`
  pub fn new(site_url: &Url, auth: Option<JiraAuth>) -> Result<Self> {
    let api_root = site_url
      .join(REST_API_PATH)
      .map_err(|e| SessionError::InvalidUrl(format!("{site_url}{REST_API_PATH}: {e}")))?;

    Ok(Self {
      client: Client::new(),
      api_root,
      auth,
    })
  }

  pub fn is_anonymous(&self) -> bool {
    self.auth.is_none()
  }

  /// URL of the resource named by `segments` below the API root; each
  /// segment is percent-encoded
  fn resource_url(&self, segments: &[&str]) -> Result<Url> {
    let mut url = self.api_root.clone();
    url
      .path_segments_mut()
      .map_err(|()| SessionError::InvalidUrl(format!("{} cannot hold a path", self.api_root)))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  /// GET the resource named by `segments` below the API root.
  ///
  /// 404 means the resource does not exist and yields `None`.
  pub async fn get_json<T: DeserializeOwned>(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Option<T>> {
    let resource = segments.join("/");
    let url = self.resource_url(segments)?;
    debug!("GET {url}");

    let mut request = self
      .client
      .get(url)
      .query(query)
      .header(header::ACCEPT, "application/json")
      .header(header::USER_AGENT, USER_AGENT);
    if let Some(auth) = &self.auth {
      request = request.basic_auth(&auth.username, Some(&auth.api_token));
    }

    let response = request
      .send()
      .await
      .map_err(|e| SessionError::from_transport(&resource, e))?;

    match response.status() {
      StatusCode::OK => {
        let body = response
          .json::<T>()
          .await
          .map_err(|e| SessionError::protocol(format!("Failed to parse {resource}: {e}")))?;
        Ok(Some(body))
      }
      StatusCode::NOT_FOUND => Ok(None),
      status => {
        let body = response.text().await.unwrap_or_default();
        Err(SessionError::from_status(status, &body))
      }
    }
  }
}
