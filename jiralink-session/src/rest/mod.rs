//! # Modern Session
//!
//! Stateless backend over the REST v2 API. Covers email lookup, the server
//! probe and the two deferred fetches; every other capability fails with
//! [`SessionError::NotSupported`] before touching the network.

mod client;
pub mod models;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use jiralink_core::{Backend, Credentials, Site};

pub use self::client::RestClient;
use self::models::{RestIssue, RestProject, RestUser};
use crate::error::{Result, SessionError};
use crate::models::{
  Component, FieldValue, Group, Issue, IssueType, JiraAuth, Project, Role, ServerInfo, Version,
};
use crate::session::{Deferred, InteractionSession};

pub struct ModernSession {
  client: Arc<RestClient>,
  site: Arc<Site>,
}

fn unsupported<T>(operation: &'static str) -> Result<T> {
  Err(SessionError::not_supported(Backend::Rest, operation))
}

impl ModernSession {
  /// Bind a session to `site`, anonymous when `credentials` is `None`.
  ///
  /// No request is made; the factory probes the session afterwards.
  pub fn new(site: Arc<Site>, credentials: Option<&Credentials>) -> Result<Self> {
    let client = RestClient::new(site.url(), credentials.map(JiraAuth::from))?;
    Ok(Self {
      client: Arc::new(client),
      site,
    })
  }

  pub fn is_anonymous(&self) -> bool {
    self.client.is_anonymous()
  }
}

#[async_trait]
impl InteractionSession for ModernSession {
  fn backend(&self) -> Backend {
    Backend::Rest
  }

  fn site(&self) -> &Site {
    &self.site
  }

  async fn get_email_for_username(&self, username: &str) -> Result<Option<String>> {
    let user: Option<RestUser> = self.client.get_json(&["user"], &[("username", username)]).await?;
    Ok(
      user
        .and_then(|user| user.email_address)
        .filter(|email| !email.is_empty()),
    )
  }

  async fn get_project_keys(&self) -> Result<HashSet<String>> {
    unsupported("get_project_keys")
  }

  async fn add_comment(&self, _: &str, _: &str, _: Option<&str>, _: Option<&str>) -> Result<()> {
    unsupported("add_comment")
  }

  async fn add_comment_without_constraints(&self, _: &str, _: &str) -> Result<()> {
    unsupported("add_comment_without_constraints")
  }

  async fn get_issue(&self, _: &str) -> Result<Option<Issue>> {
    unsupported("get_issue")
  }

  async fn get_issue_by_key(&self, _: &str) -> Result<Option<Issue>> {
    unsupported("get_issue_by_key")
  }

  async fn get_issues_from_jql_search(&self, _: &str) -> Result<Vec<Issue>> {
    unsupported("get_issues_from_jql_search")
  }

  async fn get_group(&self, _: &str) -> Result<Option<Group>> {
    unsupported("get_group")
  }

  async fn get_role(&self, _: &str) -> Result<Option<Role>> {
    unsupported("get_role")
  }

  async fn get_versions(&self, _: &str) -> Result<Vec<Version>> {
    unsupported("get_versions")
  }

  async fn get_version_by_name(&self, _: &str, _: &str) -> Result<Option<Version>> {
    unsupported("get_version_by_name")
  }

  async fn get_issues_with_fix_version(&self, _: &str, _: &str, _: Option<&str>) -> Result<Vec<Issue>> {
    unsupported("get_issues_with_fix_version")
  }

  async fn get_issue_types(&self) -> Result<Vec<IssueType>> {
    unsupported("get_issue_types")
  }

  async fn release_version(&self, _: &str, _: &Version) -> Result<()> {
    unsupported("release_version")
  }

  async fn migrate_issues_to_fix_version(&self, _: &str, _: &str, _: &str) -> Result<usize> {
    unsupported("migrate_issues_to_fix_version")
  }

  async fn replace_fix_version(&self, _: &str, _: &str, _: &str, _: &str) -> Result<usize> {
    unsupported("replace_fix_version")
  }

  async fn progress_workflow_action(&self, _: &str, _: &str, _: &[FieldValue]) -> Result<Option<String>> {
    unsupported("progress_workflow_action")
  }

  async fn get_action_id_for_issue(&self, _: &str, _: &str) -> Result<Option<String>> {
    unsupported("get_action_id_for_issue")
  }

  async fn get_status_by_id(&self, _: &str) -> Result<Option<String>> {
    unsupported("get_status_by_id")
  }

  async fn create_issue(&self, _: &str, _: &str, _: Option<&str>, _: &[Component], _: &str) -> Result<Issue> {
    unsupported("create_issue")
  }

  async fn get_components(&self, _: &str) -> Result<Vec<Component>> {
    unsupported("get_components")
  }

  async fn add_version(&self, _: &str, _: &str) -> Result<Version> {
    unsupported("add_version")
  }

  async fn get_server_info(&self) -> Result<ServerInfo> {
    self
      .client
      .get_json(&["serverInfo"], &[])
      .await?
      .ok_or_else(|| SessionError::Remote(format!("{} has no serverInfo resource", self.site.url())))
  }

  fn get_issue_async(&self, id: &str) -> Deferred<Option<Issue>> {
    let client = Arc::clone(&self.client);
    let id = id.to_string();
    Box::pin(async move {
      let issue: Option<RestIssue> = client.get_json(&["issue", id.as_str()], &[]).await?;
      Ok(issue.map(Issue::from))
    })
  }

  fn get_project_keys_async(&self) -> Deferred<Vec<Project>> {
    let client = Arc::clone(&self.client);
    Box::pin(async move {
      let projects: Option<Vec<RestProject>> = client.get_json(&["project"], &[]).await?;
      Ok(projects.unwrap_or_default().into_iter().map(Project::from).collect())
    })
  }
}
