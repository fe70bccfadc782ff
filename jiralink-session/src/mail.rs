//! # Mail Address Resolution
//!
//! Finds a CI user's email address by asking each configured Jira site for
//! the user of the same name. Jira installations often mask addresses
//! (`john dot doe at example dot com`); [`unmask_email`] turns those back
//! into real addresses.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, warn};

use crate::connection::SiteConnection;

static AT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"[( \[<_{"=]+[aA][tT][) \]>_}"=]+"#).expect("valid at pattern"));
static DOT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"[( \[<_{"=]+[dD][oO0][tT][) \]>_}"=]+"#).expect("valid dot pattern"));

/// Undo Jira's email masking, e.g. `john[dot]doe[at]example[dot]com`.
///
/// Addresses that are not masked come back unchanged.
pub fn unmask_email(email: &str) -> String {
  let email = AT.replace_all(email, "@");
  DOT.replace_all(&email, ".").into_owned()
}

/// Resolves usernames to email addresses across sites, in configured order
pub struct MailAddressResolver {
  sites: Vec<Arc<SiteConnection>>,
}

impl MailAddressResolver {
  pub fn new(sites: Vec<Arc<SiteConnection>>) -> Self {
    Self { sites }
  }

  /// The first address any site knows for `username`.
  ///
  /// Sites that cannot be reached or fail the lookup are skipped with a
  /// warning; `None` means no site had an address.
  pub async fn find_mail_address_for(&self, username: &str) -> Option<String> {
    for connection in &self.sites {
      let name = connection.site().name();

      let session = match connection.session().await {
        Ok(Some(session)) => session,
        Ok(None) => {
          warn!("Unable to create session with {name}");
          continue;
        }
        Err(e) => {
          warn!("Unable to create session with {name}: {e}");
          continue;
        }
      };

      match session.get_email_for_username(username).await {
        Ok(Some(email)) => {
          debug!("Found email for {username} on {name}");
          return Some(unmask_email(&email));
        }
        Ok(None) => debug!("{name} has no email for {username}"),
        Err(e) => warn!("Email lookup for {username} on {name} failed: {e}"),
      }
    }

    None
  }
}
