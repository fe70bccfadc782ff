use reqwest::{Client, StatusCode, header};
use tracing::debug;
use url::Url;

use super::xmlrpc::{self, Response, Value};
use crate::consts::{LEGACY_METHOD_PREFIX, USER_AGENT, XMLRPC_PATH};
use crate::error::{Result, SessionError};
use crate::models::JiraAuth;

/// Transport for the legacy RPC endpoint
pub struct RpcClient {
  client: Client,
  endpoint: Url,
  /// Sent as HTTP basic auth on every call when set
  auth: Option<JiraAuth>,
}

impl RpcClient {
  pub fn new(site_url: &Url, auth: Option<JiraAuth>) -> Result<Self> {
    let endpoint = site_url
      .join(XMLRPC_PATH)
      .map_err(|e| SessionError::InvalidUrl(format!("{site_url}{XMLRPC_PATH}: {e}")))?;

    Ok(Self {
      client: Client::new(),
      endpoint,
      auth,
    })
  }

  /// Call `jira1.<operation>` and return the decoded result value
  pub async fn call(&self, operation: &str, params: &[Value]) -> Result<Value> {
    let method = format!("{LEGACY_METHOD_PREFIX}.{operation}");
    debug!("Calling {method} at {}", self.endpoint);

    let mut request = self
      .client
      .post(self.endpoint.clone())
      .header(header::CONTENT_TYPE, "text/xml")
      .header(header::USER_AGENT, USER_AGENT)
      .body(xmlrpc::encode_call(&method, params));
    if let Some(auth) = &self.auth {
      request = request.basic_auth(&auth.username, Some(&auth.api_token));
    }

    let response = request
      .send()
      .await
      .map_err(|e| SessionError::from_transport(&method, e))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| SessionError::from_transport(&method, e))?;

    if status != StatusCode::OK {
      return Err(SessionError::from_status(status, &body));
    }

    match xmlrpc::decode_response(&body)? {
      Response::Success(value) => Ok(value),
      Response::Fault { code, message } => {
        debug!("{method} failed with fault {code}: {message}");
        Err(fault_to_error(&message))
      }
    }
  }
}

/// Faults carry the server-side exception class in their message
fn fault_to_error(message: &str) -> SessionError {
  if message.contains("RemoteAuthenticationException") || message.contains("RemotePermissionException") {
    SessionError::Authentication(message.to_string())
  } else if message.contains("RemoteValidationException") {
    SessionError::Validation(message.to_string())
  } else {
    SessionError::Remote(message.to_string())
  }
}
