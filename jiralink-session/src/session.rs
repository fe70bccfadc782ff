//! # Session Capability Interface
//!
//! [`InteractionSession`] is everything a CI server may ask of a Jira site.
//! Both backends implement the whole trait; operations a backend cannot
//! perform fail with [`SessionError::NotSupported`] instead of being left
//! out of the type.

use async_trait::async_trait;
use futures::future::BoxFuture;
use jiralink_core::{Backend, Site};

use crate::error::{Result, SessionError};
use crate::models::{Component, FieldValue, Group, Issue, IssueType, Project, Role, ServerInfo, Version};

/// A deferred result: nothing runs until the caller awaits it
pub type Deferred<T> = BoxFuture<'static, Result<T>>;

pub(crate) fn deferred_unsupported<T: Send + 'static>(backend: Backend, operation: &'static str) -> Deferred<T> {
  Box::pin(futures::future::ready(Err(SessionError::not_supported(backend, operation))))
}

/// A live, authenticated handle to one Jira site.
///
/// A session stays bound to the site and credentials it was created with.
/// Servers expire idle sessions; when calls start failing, ask the factory
/// for a new session rather than trying to repair this one.
#[async_trait]
pub trait InteractionSession: Send + Sync {
  /// Which wire protocol this session speaks
  fn backend(&self) -> Backend;

  /// The site this session is bound to
  fn site(&self) -> &Site;

  /// The email address registered for `username`, or `None` if the user is
  /// unknown or has no address
  async fn get_email_for_username(&self, username: &str) -> Result<Option<String>>;

  /// Keys of every project visible to the session, all in upper case
  async fn get_project_keys(&self) -> Result<std::collections::HashSet<String>>;

  /// Adds a comment, restricted to `group_visibility` and/or
  /// `role_visibility` when those name an existing group or role.
  ///
  /// Empty or unknown visibility values are dropped; the comment is still
  /// posted.
  async fn add_comment(
    &self,
    issue_id: &str,
    body: &str,
    group_visibility: Option<&str>,
    role_visibility: Option<&str>,
  ) -> Result<()>;

  /// Adds a comment visible to everyone who can see the issue
  async fn add_comment_without_constraints(&self, issue_id: &str, body: &str) -> Result<()>;

  /// Details of one issue, e.g. `MNG-1235`.
  ///
  /// Identifiers that cannot be issue keys on this site return `None`
  /// without a request.
  async fn get_issue(&self, id: &str) -> Result<Option<Issue>>;

  /// Like [`InteractionSession::get_issue`] without the key pattern check
  async fn get_issue_by_key(&self, id: &str) -> Result<Option<Issue>>;

  /// Issues matching a JQL query, capped at a fixed number of results
  async fn get_issues_from_jql_search(&self, jql: &str) -> Result<Vec<Issue>>;

  async fn get_group(&self, group_name: &str) -> Result<Option<Group>>;

  /// Looks a project role up by exact name among all roles
  async fn get_role(&self, role_name: &str) -> Result<Option<Role>>;

  async fn get_versions(&self, project_key: &str) -> Result<Vec<Version>>;

  async fn get_version_by_name(&self, project_key: &str, name: &str) -> Result<Option<Version>>;

  /// Issues of `project_key` carrying fix version `version`.
  ///
  /// `filter` is appended to the JQL verbatim; never pass untrusted input.
  async fn get_issues_with_fix_version(
    &self,
    project_key: &str,
    version: &str,
    filter: Option<&str>,
  ) -> Result<Vec<Issue>>;

  async fn get_issue_types(&self) -> Result<Vec<IssueType>>;

  /// Whether `id` can be an issue key on the bound site; pure pattern check
  fn exists_issue(&self, id: &str) -> bool {
    self.site().matches_issue_key(id)
  }

  async fn release_version(&self, project_key: &str, version: &Version) -> Result<()>;

  /// Replaces the fix versions of every issue matched by `jql` with
  /// `version`. Returns the number of issues updated.
  async fn migrate_issues_to_fix_version(&self, project_key: &str, version: &str, jql: &str) -> Result<usize>;

  /// Swaps `from_version` for `to_version` on every issue matched by `jql`,
  /// keeping their other fix versions. Returns the number of issues updated.
  async fn replace_fix_version(
    &self,
    project_key: &str,
    from_version: &str,
    to_version: &str,
    jql: &str,
  ) -> Result<usize>;

  /// Performs a workflow action and returns the issue's new status name
  async fn progress_workflow_action(
    &self,
    issue_key: &str,
    action_id: &str,
    fields: &[FieldValue],
  ) -> Result<Option<String>>;

  /// Id of the workflow action named `action_name` (case-insensitive)
  async fn get_action_id_for_issue(&self, issue_key: &str, action_name: &str) -> Result<Option<String>>;

  async fn get_status_by_id(&self, status_id: &str) -> Result<Option<String>>;

  async fn create_issue(
    &self,
    project_key: &str,
    description: &str,
    assignee: Option<&str>,
    components: &[Component],
    summary: &str,
  ) -> Result<Issue>;

  async fn get_components(&self, project_key: &str) -> Result<Vec<Component>>;

  async fn add_version(&self, version: &str, project_key: &str) -> Result<Version>;

  /// Server metadata; cheap enough to serve as a connectivity probe
  async fn get_server_info(&self) -> Result<ServerInfo>;

  /// Deferred issue fetch; await the handle to get the issue
  fn get_issue_async(&self, id: &str) -> Deferred<Option<Issue>>;

  /// Deferred fetch of every visible project
  fn get_project_keys_async(&self) -> Deferred<Vec<Project>>;
}
