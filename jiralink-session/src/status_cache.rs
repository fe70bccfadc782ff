//! Per-session cache of status id to status name.
//!
//! The whole status table is fetched on first use. An unknown id triggers
//! exactly one refetch (an admin may have added a status since); if the id
//! is still unknown afterwards the lookup yields `None`.

use std::collections::HashMap;
use std::future::Future;

use tokio::sync::Mutex;
use tracing::warn;

use crate::error::Result;
use crate::models::Status;

#[derive(Debug, Default)]
pub struct StatusCache {
  known: Mutex<Option<HashMap<String, String>>>,
}

impl StatusCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Resolve `status_id` to a name, calling `fetch` to (re)load the table.
  ///
  /// `fetch` runs at most twice per call and never concurrently: the table
  /// is filled while holding the lock.
  pub async fn resolve<F, Fut>(&self, status_id: &str, fetch: F) -> Result<Option<String>>
  where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Vec<Status>>>,
  {
    let mut known = self.known.lock().await;

    if known.is_none() {
      *known = Some(index(fetch().await?));
    }
    if let Some(name) = known.as_ref().and_then(|table| table.get(status_id)) {
      return Ok(Some(name.clone()));
    }

    warn!("Jira status {status_id} is unknown, checking Jira for new status types");
    let refreshed = index(fetch().await?);
    let name = refreshed.get(status_id).cloned();
    *known = Some(refreshed);

    Ok(name)
  }
}

fn index(statuses: Vec<Status>) -> HashMap<String, String> {
  statuses.into_iter().map(|status| (status.id, status.name)).collect()
}
