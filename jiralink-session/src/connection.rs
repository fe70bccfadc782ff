use std::sync::Arc;

use jiralink_core::{CredentialStore, Site};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Result, SessionError};
use crate::factory::{SharedSession, create_session};

/// A configured site plus the session currently used to talk to it.
///
/// The session is created on first use and reused afterwards. Sessions never
/// renew themselves; call [`SiteConnection::refresh`] once the server has
/// expired one.
pub struct SiteConnection {
  site: Arc<Site>,
  credentials: Arc<dyn CredentialStore>,
  session: Mutex<Option<SharedSession>>,
}

impl SiteConnection {
  pub fn new(site: Site, credentials: Arc<dyn CredentialStore>) -> Self {
    Self {
      site: Arc::new(site),
      credentials,
      session: Mutex::new(None),
    }
  }

  pub fn site(&self) -> &Site {
    &self.site
  }

  /// The cached session, creating one if there is none yet.
  ///
  /// `Ok(None)` means the site could not be connected to; the failure is not
  /// cached, so the next call tries again.
  pub async fn session(&self) -> Result<Option<SharedSession>> {
    let mut cached = self.session.lock().await;
    if let Some(session) = cached.as_ref() {
      return Ok(Some(Arc::clone(session)));
    }

    let credentials = self
      .credentials
      .lookup(self.site.url())
      .map_err(|e| SessionError::CredentialLookup(format!("{e:#}")))?;
    debug!(
      "Creating session for {} ({})",
      self.site.name(),
      if credentials.is_some() { "authenticated" } else { "anonymous" }
    );

    let created = create_session(Arc::clone(&self.site), credentials.as_ref()).await?;
    (*cached).clone_from(&created);
    Ok(created)
  }

  /// Drop the cached session and create a new one
  pub async fn refresh(&self) -> Result<Option<SharedSession>> {
    self.session.lock().await.take();
    self.session().await
  }
}
