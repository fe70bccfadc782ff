//! Session factory: picks the backend a site is configured for, connects and
//! proves the connection with a server metadata probe.
//!
//! Expected failures (bad URL, rejected credentials, unreachable host, failed
//! probe) come back as `Ok(None)`; only unexpected ones are errors.

use std::sync::Arc;

use jiralink_core::{Backend, Credentials, ProbePolicy, Site};
use tracing::{info, warn};

use crate::error::{Result, SessionError};
use crate::legacy::LegacySession;
use crate::rest::ModernSession;
use crate::session::InteractionSession;

pub type SharedSession = Arc<dyn InteractionSession>;

/// Create a session for `site`, anonymous when `credentials` is `None`
pub async fn create_session(site: Arc<Site>, credentials: Option<&Credentials>) -> Result<Option<SharedSession>> {
  let name = site.name().to_string();

  let (session, anonymous) = match connect(site, credentials).await {
    Ok(Some(connected)) => connected,
    Ok(None) => return Ok(None),
    Err(e) if e.is_expected_connect_failure() => {
      warn!("Could not connect to Jira site {name}: {e}");
      return Ok(None);
    }
    Err(e) => return Err(e),
  };

  match session.get_server_info().await {
    Ok(server) => {
      info!(
        "Connected to Jira site {name} ({}, version {})",
        session.backend(),
        server.version
      );
      Ok(Some(session))
    }
    Err(SessionError::Authentication(msg)) if anonymous && session.site().probe_policy() == ProbePolicy::Lenient => {
      warn!("Server info of {name} is not readable anonymously ({msg}); keeping the session anyway");
      Ok(Some(session))
    }
    Err(e) => {
      warn!("Jira site {name} failed the connection probe: {e}");
      Ok(None)
    }
  }
}

/// Returns the session and whether it is anonymous
async fn connect(site: Arc<Site>, credentials: Option<&Credentials>) -> Result<Option<(SharedSession, bool)>> {
  match site.backend() {
    Backend::Legacy => {
      let Some(credentials) = credentials else {
        warn!("Jira site {} needs credentials for the legacy backend", site.name());
        return Ok(None);
      };
      let session = LegacySession::connect(site, credentials).await?;
      Ok(Some((Arc::new(session), false)))
    }
    Backend::Rest => {
      if credentials.is_none() && !site.allow_anonymous() {
        warn!("Jira site {} has no credentials and anonymous access is disabled", site.name());
        return Ok(None);
      }
      let session = ModernSession::new(site, credentials)?;
      let anonymous = session.is_anonymous();
      Ok(Some((Arc::new(session), anonymous)))
    }
  }
}
