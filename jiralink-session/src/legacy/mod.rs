//! # Legacy Session
//!
//! Token-based backend speaking the XML-RPC flavour of the legacy remote API.
//! Implements the whole capability interface except the deferred variants.
//!
//! The server expires idle tokens on its own schedule; a session that starts
//! failing with authentication errors must be replaced through the factory.

mod client;
pub mod xmlrpc;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use jiralink_core::{Backend, Credentials, Site};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use self::client::RpcClient;
use self::xmlrpc::Value;
use crate::consts::{DEFAULT_ISSUE_TYPE, FIX_VERSIONS_FIELD, SEARCH_MAX_RESULTS, UNBOUNDED_RESULTS};
use crate::error::{Result, SessionError};
use crate::models::{
  Comment, Component, FieldValue, Group, Issue, IssueType, JiraAuth, NewIssue, NewVersion, Project, Role, ServerInfo,
  Status, User, Version, WorkflowAction,
};
use crate::session::{Deferred, InteractionSession, deferred_unsupported};
use crate::status_cache::StatusCache;

pub struct LegacySession {
  rpc: RpcClient,
  /// `None` in HTTP-auth mode, where every request carries basic auth
  token: Option<String>,
  site: Arc<Site>,
  project_keys: OnceCell<HashSet<String>>,
  statuses: StatusCache,
}

impl LegacySession {
  /// Log in to `site` and bind a new session to the returned token.
  ///
  /// Sites in HTTP-auth mode skip the login call.
  pub async fn connect(site: Arc<Site>, credentials: &Credentials) -> Result<Self> {
    if site.use_http_auth() {
      let rpc = RpcClient::new(site.url(), Some(JiraAuth::from(credentials)))?;
      info!("Using HTTP authentication for {} as {}", site.url(), credentials.username);
      return Ok(Self::bind(rpc, None, site));
    }

    let rpc = RpcClient::new(site.url(), None)?;
    let token = match rpc
      .call(
        "login",
        &[
          Value::from(credentials.username.as_str()),
          Value::from(credentials.password.as_str()),
        ],
      )
      .await?
    {
      Value::String(token) => token,
      other => return Err(SessionError::protocol(format!("login returned {other:?} instead of a token"))),
    };

    info!("Logged in to {} as {}", site.url(), credentials.username);
    Ok(Self::bind(rpc, Some(token), site))
  }

  fn bind(rpc: RpcClient, token: Option<String>, site: Arc<Site>) -> Self {
    Self {
      rpc,
      token,
      site,
      project_keys: OnceCell::new(),
      statuses: StatusCache::new(),
    }
  }

  /// The session token, if the session logged in
  pub fn token(&self) -> Option<&str> {
    self.token.as_deref()
  }

  /// Call `operation` with the token prepended and decode the result
  async fn invoke<T: DeserializeOwned>(&self, operation: &str, args: Vec<Value>) -> Result<T> {
    let mut params = Vec::with_capacity(args.len() + 1);
    params.push(Value::from(self.token.clone().unwrap_or_default()));
    params.extend(args);

    let value = self.rpc.call(operation, &params).await?;
    serde_json::from_value(value.into())
      .map_err(|e| SessionError::protocol(format!("Failed to decode {operation} response: {e}")))
  }

  /// Like `invoke` for calls whose result is a list the server may send as nil
  async fn invoke_list<T: DeserializeOwned>(&self, operation: &str, args: Vec<Value>) -> Result<Vec<T>> {
    let items: Option<Vec<T>> = self.invoke(operation, args).await?;
    Ok(items.unwrap_or_default())
  }

  async fn fetch_statuses(&self) -> Result<Vec<Status>> {
    debug!("Fetching status table from {}", self.site.url());
    self.invoke_list("getStatuses", vec![]).await
  }

  async fn search(&self, jql: &str, max_results: i32) -> Result<Vec<Issue>> {
    self
      .invoke_list("getIssuesFromJqlSearch", vec![Value::from(jql), Value::from(max_results)])
      .await
  }

  async fn set_fix_versions(&self, issue_key: &str, version_ids: Vec<String>) -> Result<()> {
    let fields = [FieldValue::new(FIX_VERSIONS_FIELD, version_ids)];
    let _: IgnoredAny = self
      .invoke("updateIssue", vec![Value::from(issue_key), to_param(&fields)?])
      .await?;
    Ok(())
  }

  /// Apply `new_fix_versions` to every issue in order, stopping at the first
  /// failure
  async fn update_each<F>(&self, issues: &[Issue], new_fix_versions: F) -> Result<usize>
  where
    F: Fn(&Issue) -> Vec<String>,
  {
    for (updated, issue) in issues.iter().enumerate() {
      debug!("Updating fix versions of {}", issue.key);
      if let Err(source) = self.set_fix_versions(&issue.key, new_fix_versions(issue)).await {
        return Err(SessionError::BulkUpdate {
          issue: issue.key.clone(),
          updated,
          source: Box::new(source),
        });
      }
    }
    Ok(issues.len())
  }

  /// Visibility value to use, or `None` when it does not name anything that
  /// exists
  async fn checked_visibility<T, Fut>(kind: &str, value: &str, lookup: Fut) -> Result<Option<String>>
  where
    Fut: Future<Output = Result<Option<T>>>,
  {
    if value.is_empty() {
      return Ok(None);
    }

    match lookup.await {
      Ok(Some(_)) => Ok(Some(value.to_string())),
      Ok(None) => {
        warn!("Jira has no {kind} named '{value}', posting the comment without it");
        Ok(None)
      }
      Err(SessionError::Validation(msg)) => {
        warn!("Could not check {kind} '{value}' ({msg}), posting the comment without it");
        Ok(None)
      }
      Err(e) => Err(e),
    }
  }
}

/// Project role as the server sends it; some roles come back without a name
#[derive(Debug, Deserialize)]
struct RemoteRole {
  #[serde(default)]
  id: i64,
  name: Option<String>,
  #[serde(default)]
  description: Option<String>,
}

impl RemoteRole {
  fn into_role(self) -> Option<Role> {
    let name = self.name?;
    Some(Role {
      id: self.id,
      name,
      description: self.description,
    })
  }
}

fn to_param<T: Serialize>(value: &T) -> Result<Value> {
  serde_json::to_value(value)
    .map(|json| Value::from_json(&json))
    .map_err(SessionError::protocol)
}

#[async_trait]
impl InteractionSession for LegacySession {
  fn backend(&self) -> Backend {
    Backend::Legacy
  }

  fn site(&self) -> &Site {
    &self.site
  }

  async fn get_email_for_username(&self, username: &str) -> Result<Option<String>> {
    let user: Option<User> = self.invoke("getUser", vec![Value::from(username)]).await?;
    Ok(user.and_then(|u| u.email).filter(|email| !email.is_empty()))
  }

  async fn get_project_keys(&self) -> Result<HashSet<String>> {
    let keys = self
      .project_keys
      .get_or_try_init(|| async {
        debug!("Fetching project keys from {}", self.site.url());
        let projects: Vec<Project> = self.invoke_list("getProjectsNoSchemes", vec![]).await?;
        let keys: HashSet<String> = projects.into_iter().map(|p| p.key.to_uppercase()).collect();
        debug!("Project keys: {keys:?}");
        Ok::<_, SessionError>(keys)
      })
      .await?;
    Ok(keys.clone())
  }

  async fn add_comment(
    &self,
    issue_id: &str,
    body: &str,
    group_visibility: Option<&str>,
    role_visibility: Option<&str>,
  ) -> Result<()> {
    let mut comment = Comment::new(body);

    if let Some(role) = role_visibility {
      comment.role_level = Self::checked_visibility("role", role, self.get_role(role)).await?;
    }
    if let Some(group) = group_visibility {
      comment.group_level = Self::checked_visibility("group", group, self.get_group(group)).await?;
    }

    let _: IgnoredAny = self
      .invoke("addComment", vec![Value::from(issue_id), to_param(&comment)?])
      .await?;
    Ok(())
  }

  async fn add_comment_without_constraints(&self, issue_id: &str, body: &str) -> Result<()> {
    let _: IgnoredAny = self
      .invoke("addComment", vec![Value::from(issue_id), to_param(&Comment::new(body))?])
      .await?;
    Ok(())
  }

  async fn get_issue(&self, id: &str) -> Result<Option<Issue>> {
    if !self.exists_issue(id) {
      return Ok(None);
    }
    self.get_issue_by_key(id).await
  }

  async fn get_issue_by_key(&self, id: &str) -> Result<Option<Issue>> {
    self.invoke("getIssue", vec![Value::from(id)]).await
  }

  async fn get_issues_from_jql_search(&self, jql: &str) -> Result<Vec<Issue>> {
    self.search(jql, SEARCH_MAX_RESULTS).await
  }

  async fn get_group(&self, group_name: &str) -> Result<Option<Group>> {
    debug!("Fetching group {group_name}");
    match self.invoke("getGroup", vec![Value::from(group_name)]).await {
      Err(SessionError::Validation(msg)) => {
        debug!("Group {group_name} not found: {msg}");
        Ok(None)
      }
      other => other,
    }
  }

  async fn get_role(&self, role_name: &str) -> Result<Option<Role>> {
    debug!("Fetching role {role_name}");
    let roles: Vec<Option<RemoteRole>> = self.invoke_list("getProjectRoles", vec![]).await?;
    let role = roles
      .into_iter()
      .flatten()
      .filter_map(RemoteRole::into_role)
      .find(|role| role.name == role_name);
    if role.is_none() {
      info!("Did not find role named {role_name}");
    }
    Ok(role)
  }

  async fn get_versions(&self, project_key: &str) -> Result<Vec<Version>> {
    debug!("Fetching versions of project {project_key}");
    self.invoke_list("getVersions", vec![Value::from(project_key)]).await
  }

  async fn get_version_by_name(&self, project_key: &str, name: &str) -> Result<Option<Version>> {
    let versions = self.get_versions(project_key).await?;
    Ok(versions.into_iter().find(|version| version.name == name))
  }

  async fn get_issues_with_fix_version(
    &self,
    project_key: &str,
    version: &str,
    filter: Option<&str>,
  ) -> Result<Vec<Issue>> {
    let mut jql = format!("project = \"{project_key}\" AND fixVersion = \"{version}\"");
    if let Some(filter) = filter.filter(|f| !f.is_empty()) {
      jql.push_str(" AND ");
      jql.push_str(filter);
    }
    debug!("Searching fix version issues with {jql}");
    self.search(&jql, UNBOUNDED_RESULTS).await
  }

  async fn get_issue_types(&self) -> Result<Vec<IssueType>> {
    self.invoke_list("getIssueTypes", vec![]).await
  }

  async fn release_version(&self, project_key: &str, version: &Version) -> Result<()> {
    info!("Releasing version {} of {project_key}", version.name);
    let released = Version {
      released: true,
      ..version.clone()
    };
    let _: IgnoredAny = self
      .invoke("releaseVersion", vec![Value::from(project_key), to_param(&released)?])
      .await?;
    Ok(())
  }

  async fn migrate_issues_to_fix_version(&self, project_key: &str, version: &str, jql: &str) -> Result<usize> {
    let Some(target) = self.get_version_by_name(project_key, version).await? else {
      debug!("Version {version} does not exist in {project_key}, nothing to migrate");
      return Ok(0);
    };

    let issues = self.search(jql, UNBOUNDED_RESULTS).await?;
    debug!("Migrating {} issue(s) to {version}", issues.len());

    self.update_each(&issues, |_| vec![target.id.clone()]).await
  }

  async fn replace_fix_version(
    &self,
    project_key: &str,
    from_version: &str,
    to_version: &str,
    jql: &str,
  ) -> Result<usize> {
    let Some(target) = self.get_version_by_name(project_key, to_version).await? else {
      debug!("Version {to_version} does not exist in {project_key}, nothing to replace");
      return Ok(0);
    };

    let issues = self.search(jql, UNBOUNDED_RESULTS).await?;
    debug!("Replacing {from_version} with {to_version} on {} issue(s)", issues.len());

    self
      .update_each(&issues, |issue| {
        let mut ids: Vec<String> = issue
          .fix_versions
          .iter()
          .filter(|current| current.name != from_version)
          .map(|current| current.id.clone())
          .collect();
        if !ids.contains(&target.id) {
          ids.push(target.id.clone());
        }
        ids
      })
      .await
  }

  async fn progress_workflow_action(
    &self,
    issue_key: &str,
    action_id: &str,
    fields: &[FieldValue],
  ) -> Result<Option<String>> {
    info!("Progressing {issue_key} with workflow action {action_id}");
    let issue: Issue = self
      .invoke(
        "progressWorkflowAction",
        vec![Value::from(issue_key), Value::from(action_id), to_param(&fields)?],
      )
      .await?;

    match issue.status {
      Some(status_id) => self.get_status_by_id(&status_id).await,
      None => Ok(None),
    }
  }

  async fn get_action_id_for_issue(&self, issue_key: &str, action_name: &str) -> Result<Option<String>> {
    let actions: Vec<WorkflowAction> = self
      .invoke_list("getAvailableActions", vec![Value::from(issue_key)])
      .await?;
    Ok(
      actions
        .into_iter()
        .find(|action| action.name.eq_ignore_ascii_case(action_name))
        .map(|action| action.id),
    )
  }

  async fn get_status_by_id(&self, status_id: &str) -> Result<Option<String>> {
    self.statuses.resolve(status_id, || self.fetch_statuses()).await
  }

  async fn create_issue(
    &self,
    project_key: &str,
    description: &str,
    assignee: Option<&str>,
    components: &[Component],
    summary: &str,
  ) -> Result<Issue> {
    let issue = NewIssue {
      project: project_key.to_uppercase(),
      summary,
      description,
      assignee,
      issue_type: DEFAULT_ISSUE_TYPE,
      components,
    };
    self.invoke("createIssue", vec![to_param(&issue)?]).await
  }

  async fn get_components(&self, project_key: &str) -> Result<Vec<Component>> {
    self.invoke_list("getComponents", vec![Value::from(project_key)]).await
  }

  async fn add_version(&self, version: &str, project_key: &str) -> Result<Version> {
    self
      .invoke(
        "addVersion",
        vec![Value::from(project_key), to_param(&NewVersion { name: version })?],
      )
      .await
  }

  async fn get_server_info(&self) -> Result<ServerInfo> {
    self.invoke("getServerInfo", vec![]).await
  }

  fn get_issue_async(&self, _id: &str) -> Deferred<Option<Issue>> {
    deferred_unsupported(Backend::Legacy, "get_issue_async")
  }

  fn get_project_keys_async(&self) -> Deferred<Vec<Project>> {
    deferred_unsupported(Backend::Legacy, "get_project_keys_async")
  }
}

#[cfg(test)]
mod tests {
  use wiremock::matchers::{basic_auth, body_string_contains, method, path};
  use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

  use super::*;

  fn rpc(operation: &str) -> MockBuilder {
    Mock::given(method("POST"))
      .and(path("/rpc/xmlrpc"))
      .and(body_string_contains(format!("<methodName>jira1.{operation}</methodName>")))
  }

  fn respond(value: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(format!(
      "<methodResponse><params><param><value>{value}</value></param></params></methodResponse>"
    ))
  }

  fn fault(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(format!(
      "<methodResponse><fault><value><struct>\
       <member><name>faultCode</name><value><int>0</int></value></member>\
       <member><name>faultString</name><value>{message}</value></member>\
       </struct></value></fault></methodResponse>"
    ))
  }

  fn record(members: &[(&str, &str)]) -> String {
    let members: String = members
      .iter()
      .map(|(name, value)| format!("<member><name>{name}</name><value>{value}</value></member>"))
      .collect();
    format!("<struct>{members}</struct>")
  }

  fn list(values: &[String]) -> String {
    let values: String = values.iter().map(|v| format!("<value>{v}</value>")).collect();
    format!("<array><data>{values}</data></array>")
  }

  fn site(server: &MockServer) -> Arc<Site> {
    Arc::new(
      Site::new("test", &server.uri())
        .unwrap()
        .with_backend(Backend::Legacy)
        .with_issue_pattern("MNG-[0-9]+")
        .unwrap(),
    )
  }

  async fn logged_in(server: &MockServer) -> LegacySession {
    rpc("login")
      .respond_with(respond("tok-1"))
      .expect(1)
      .mount(server)
      .await;
    LegacySession::connect(site(server), &Credentials::new("ci", "secret"))
      .await
      .unwrap()
  }

  async fn bodies(server: &MockServer, operation: &str) -> Vec<String> {
    let marker = format!("<methodName>jira1.{operation}</methodName>");
    server
      .received_requests()
      .await
      .unwrap_or_default()
      .into_iter()
      .map(|request| String::from_utf8_lossy(&request.body).into_owned())
      .filter(|body| body.contains(&marker))
      .collect()
  }

  #[tokio::test]
  async fn test_login_token_is_sent_with_every_call() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let session = logged_in(&mock_server).await;
    assert_eq!(session.token(), Some("tok-1"));

    rpc("getUser")
      .and(body_string_contains("<string>tok-1</string>"))
      .respond_with(respond(&record(&[("name", "ci"), ("email", "ci@example.com")])))
      .expect(1)
      .mount(&mock_server)
      .await;

    let email = session.get_email_for_username("ci").await?;
    assert_eq!(email.as_deref(), Some("ci@example.com"));

    Ok(())
  }

  #[tokio::test]
  async fn test_rejected_login_is_authentication_error() {
    let mock_server = MockServer::start().await;
    rpc("login")
      .respond_with(fault(
        "com.atlassian.jira.rpc.exception.RemoteAuthenticationException: Invalid username or password.",
      ))
      .mount(&mock_server)
      .await;

    let result = LegacySession::connect(site(&mock_server), &Credentials::new("ci", "wrong")).await;
    assert!(matches!(result, Err(SessionError::Authentication(_))));
  }

  #[tokio::test]
  async fn test_http_auth_mode_skips_login() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    rpc("login").respond_with(respond("unused")).expect(0).mount(&mock_server).await;
    rpc("getServerInfo")
      .and(basic_auth("ci", "secret"))
      .and(body_string_contains("<string></string>"))
      .respond_with(respond(&record(&[("version", "4.4.5"), ("baseUrl", "http://jira")])))
      .expect(1)
      .mount(&mock_server)
      .await;

    let site = Arc::new(
      Site::new("test", &mock_server.uri())?
        .with_backend(Backend::Legacy)
        .with_http_auth(true),
    );
    let session = LegacySession::connect(site, &Credentials::new("ci", "secret")).await?;
    assert_eq!(session.token(), None);

    let info = session.get_server_info().await?;
    assert_eq!(info.version, "4.4.5");

    Ok(())
  }

  #[tokio::test]
  async fn test_missing_email_is_none() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let session = logged_in(&mock_server).await;
    rpc("getUser")
      .respond_with(respond(&record(&[("name", "ci"), ("email", "")])))
      .mount(&mock_server)
      .await;

    assert_eq!(session.get_email_for_username("ci").await?, None);

    Ok(())
  }

  #[tokio::test]
  async fn test_project_keys_are_uppercase_and_cached() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let session = logged_in(&mock_server).await;
    rpc("getProjectsNoSchemes")
      .respond_with(respond(&list(&[
        record(&[("id", "1"), ("key", "mng")]),
        record(&[("id", "2"), ("key", "JENKINS")]),
      ])))
      .expect(1)
      .mount(&mock_server)
      .await;

    let expected: HashSet<String> = ["MNG", "JENKINS"].into_iter().map(String::from).collect();
    assert_eq!(session.get_project_keys().await?, expected);
    assert_eq!(session.get_project_keys().await?, expected);

    Ok(())
  }

  #[tokio::test]
  async fn test_get_issue_checks_pattern_before_calling() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let session = logged_in(&mock_server).await;
    rpc("getIssue")
      .and(body_string_contains("MNG-1235"))
      .respond_with(respond(&record(&[("key", "MNG-1235"), ("summary", "Broken build")])))
      .expect(1)
      .mount(&mock_server)
      .await;

    assert!(session.exists_issue("MNG-1235"));
    assert!(!session.exists_issue("not-an-id"));
    assert_eq!(session.get_issue("not-an-id").await?, None);

    let issue = session.get_issue("MNG-1235").await?.expect("issue");
    assert_eq!(issue.summary, "Broken build");

    Ok(())
  }

  #[tokio::test]
  async fn test_status_miss_refetches_once() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let session = logged_in(&mock_server).await;
    rpc("getStatuses")
      .respond_with(respond(&list(&[record(&[("id", "1"), ("name", "Open")])])))
      .up_to_n_times(1)
      .expect(1)
      .mount(&mock_server)
      .await;
    rpc("getStatuses")
      .respond_with(respond(&list(&[
        record(&[("id", "1"), ("name", "Open")]),
        record(&[("id", "10100"), ("name", "In Review")]),
      ])))
      .expect(1)
      .mount(&mock_server)
      .await;
    rpc("progressWorkflowAction")
      .respond_with(respond(&record(&[("key", "MNG-1"), ("status", "10100")])))
      .mount(&mock_server)
      .await;

    let status = session.progress_workflow_action("MNG-1", "5", &[]).await?;
    assert_eq!(status.as_deref(), Some("In Review"));
    assert_eq!(session.get_status_by_id("10100").await?.as_deref(), Some("In Review"));

    Ok(())
  }

  #[tokio::test]
  async fn test_comment_drops_unknown_visibility() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let session = logged_in(&mock_server).await;
    rpc("getProjectRoles")
      .respond_with(respond(&list(&[record(&[
        ("id", "<int>10002</int>"),
        ("name", "Developers"),
      ])])))
      .mount(&mock_server)
      .await;
    rpc("getGroup")
      .respond_with(fault(
        "com.atlassian.jira.rpc.exception.RemoteValidationException: no group named ghosts",
      ))
      .mount(&mock_server)
      .await;
    rpc("addComment").respond_with(respond("")).expect(1).mount(&mock_server).await;

    session
      .add_comment("MNG-1", "Integrated in build #12", Some("ghosts"), Some("Developers"))
      .await?;

    let posted = bodies(&mock_server, "addComment").await;
    assert_eq!(posted.len(), 1);
    assert!(posted[0].contains("<name>roleLevel</name><value><string>Developers</string></value>"));
    assert!(!posted[0].contains("groupLevel"));

    Ok(())
  }

  #[tokio::test]
  async fn test_comment_skips_roles_without_name() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let session = logged_in(&mock_server).await;
    rpc("getProjectRoles")
      .respond_with(respond(&list(&[
        "<nil/>".to_string(),
        record(&[("id", "<int>1</int>"), ("name", "<nil/>")]),
        record(&[("id", "<int>2</int>"), ("name", "Developers")]),
      ])))
      .mount(&mock_server)
      .await;
    rpc("addComment").respond_with(respond("")).expect(1).mount(&mock_server).await;

    let role = session.get_role("Developers").await?.expect("role");
    assert_eq!(role.id, 2);

    session.add_comment("MNG-1", "hi", None, Some("Developers")).await?;

    let posted = bodies(&mock_server, "addComment").await;
    assert_eq!(posted.len(), 1);
    assert!(posted[0].contains("<name>roleLevel</name><value><string>Developers</string></value>"));

    Ok(())
  }

  #[tokio::test]
  async fn test_fix_version_jql() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let session = logged_in(&mock_server).await;
    rpc("getIssuesFromJqlSearch")
      .respond_with(respond(&list(&[])))
      .mount(&mock_server)
      .await;

    session.get_issues_with_fix_version("MNG", "1.0", Some("status = Open")).await?;
    session.get_issues_with_fix_version("MNG", "1.0", Some("")).await?;

    let searches = bodies(&mock_server, "getIssuesFromJqlSearch").await;
    assert!(searches[0].contains("project = &quot;MNG&quot; AND fixVersion = &quot;1.0&quot; AND status = Open"));
    assert!(searches[0].contains("<int>2147483647</int>"));
    assert!(searches[1].contains("fixVersion = &quot;1.0&quot;</string>"));

    Ok(())
  }

  fn versions_response() -> ResponseTemplate {
    respond(&list(&[
      record(&[("id", "10"), ("name", "1.0")]),
      record(&[("id", "20"), ("name", "2.0")]),
      record(&[("id", "30"), ("name", "3.0")]),
    ]))
  }

  #[tokio::test]
  async fn test_replace_fix_version_keeps_other_versions() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let session = logged_in(&mock_server).await;
    rpc("getVersions").respond_with(versions_response()).mount(&mock_server).await;
    rpc("getIssuesFromJqlSearch")
      .respond_with(respond(&list(&[format!(
        "<struct><member><name>key</name><value>MNG-7</value></member>\
         <member><name>fixVersions</name><value>{}</value></member></struct>",
        list(&[
          record(&[("id", "10"), ("name", "1.0")]),
          record(&[("id", "20"), ("name", "2.0")]),
        ])
      )])))
      .mount(&mock_server)
      .await;
    rpc("updateIssue").respond_with(respond("")).expect(1).mount(&mock_server).await;

    let updated = session.replace_fix_version("MNG", "1.0", "3.0", "project = MNG").await?;
    assert_eq!(updated, 1);

    let update = &bodies(&mock_server, "updateIssue").await[0];
    assert!(update.contains("<string>MNG-7</string>"));
    assert!(update.contains("<value><string>20</string></value><value><string>30</string></value>"));
    assert!(!update.contains("<string>10</string>"));

    Ok(())
  }

  #[tokio::test]
  async fn test_missing_target_version_is_noop() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let session = logged_in(&mock_server).await;
    rpc("getVersions").respond_with(versions_response()).mount(&mock_server).await;
    rpc("getIssuesFromJqlSearch")
      .respond_with(respond(&list(&[])))
      .expect(0)
      .mount(&mock_server)
      .await;

    assert_eq!(session.migrate_issues_to_fix_version("MNG", "9.9", "project = MNG").await?, 0);

    Ok(())
  }

  #[tokio::test]
  async fn test_migrate_replaces_fix_versions_with_target() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let session = logged_in(&mock_server).await;
    rpc("getVersions").respond_with(versions_response()).mount(&mock_server).await;
    rpc("getIssuesFromJqlSearch")
      .respond_with(respond(&list(&[
        format!(
          "<struct><member><name>key</name><value>MNG-1</value></member>\
           <member><name>fixVersions</name><value>{}</value></member></struct>",
          list(&[
            record(&[("id", "10"), ("name", "1.0")]),
            record(&[("id", "20"), ("name", "2.0")]),
          ])
        ),
        record(&[("key", "MNG-2")]),
      ])))
      .mount(&mock_server)
      .await;
    rpc("updateIssue").respond_with(respond("")).expect(2).mount(&mock_server).await;

    let updated = session
      .migrate_issues_to_fix_version("MNG", "3.0", "project = MNG")
      .await?;
    assert_eq!(updated, 2);

    let updates = bodies(&mock_server, "updateIssue").await;
    assert_eq!(updates.len(), 2);
    for (update, key) in updates.iter().zip(["MNG-1", "MNG-2"]) {
      assert!(update.contains(&format!("<string>{key}</string>")));
      assert!(update.contains("<array><data><value><string>30</string></value></data></array>"));
      assert!(!update.contains("<string>10</string>"));
      assert!(!update.contains("<string>20</string>"));
    }

    Ok(())
  }

  #[tokio::test]
  async fn test_empty_search_updates_nothing() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let session = logged_in(&mock_server).await;
    rpc("getVersions").respond_with(versions_response()).mount(&mock_server).await;
    rpc("getIssuesFromJqlSearch")
      .respond_with(respond(&list(&[])))
      .expect(2)
      .mount(&mock_server)
      .await;
    rpc("updateIssue").respond_with(respond("")).expect(0).mount(&mock_server).await;

    assert_eq!(
      session
        .migrate_issues_to_fix_version("MNG", "3.0", "project = MNG AND fixVersion = 9.9")
        .await?,
      0
    );
    assert_eq!(
      session
        .replace_fix_version("MNG", "1.0", "3.0", "project = MNG AND fixVersion = 9.9")
        .await?,
      0
    );
    assert!(bodies(&mock_server, "updateIssue").await.is_empty());

    Ok(())
  }

  #[tokio::test]
  async fn test_migrate_stops_at_first_failure() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let session = logged_in(&mock_server).await;
    rpc("getVersions").respond_with(versions_response()).mount(&mock_server).await;
    rpc("getIssuesFromJqlSearch")
      .respond_with(respond(&list(&[
        record(&[("key", "MNG-1")]),
        record(&[("key", "MNG-2")]),
        record(&[("key", "MNG-3")]),
      ])))
      .mount(&mock_server)
      .await;
    rpc("updateIssue")
      .and(body_string_contains("MNG-2"))
      .respond_with(fault("com.atlassian.jira.rpc.exception.RemotePermissionException: read only"))
      .mount(&mock_server)
      .await;
    rpc("updateIssue").respond_with(respond("")).mount(&mock_server).await;

    let err = session
      .migrate_issues_to_fix_version("MNG", "3.0", "project = MNG")
      .await
      .unwrap_err();

    match err {
      SessionError::BulkUpdate { issue, updated, source } => {
        assert_eq!(issue, "MNG-2");
        assert_eq!(updated, 1);
        assert!(matches!(*source, SessionError::Authentication(_)));
      }
      other => panic!("expected bulk update error, got {other:?}"),
    }
    assert_eq!(bodies(&mock_server, "updateIssue").await.len(), 2);

    Ok(())
  }

  #[tokio::test]
  async fn test_create_issue_uppercases_project() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let session = logged_in(&mock_server).await;
    rpc("createIssue")
      .and(body_string_contains("<name>project</name><value><string>MNG</string></value>"))
      .and(body_string_contains("<name>type</name><value><string>1</string></value>"))
      .respond_with(respond(&record(&[("key", "MNG-99"), ("summary", "Build failed")])))
      .expect(1)
      .mount(&mock_server)
      .await;

    let issue = session
      .create_issue("mng", "see log", None, &[], "Build failed")
      .await?;
    assert_eq!(issue.key, "MNG-99");

    Ok(())
  }

  #[tokio::test]
  async fn test_action_lookup_ignores_case() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let session = logged_in(&mock_server).await;
    rpc("getAvailableActions")
      .respond_with(respond(&list(&[
        record(&[("id", "5"), ("name", "Resolve Issue")]),
        record(&[("id", "2"), ("name", "Close Issue")]),
      ])))
      .mount(&mock_server)
      .await;

    assert_eq!(
      session.get_action_id_for_issue("MNG-1", "close issue").await?.as_deref(),
      Some("2")
    );
    assert_eq!(session.get_action_id_for_issue("MNG-1", "Reopen").await?, None);

    Ok(())
  }

  #[tokio::test]
  async fn test_async_variants_are_not_supported() {
    let mock_server = MockServer::start().await;
    let session = logged_in(&mock_server).await;

    assert!(session.get_issue_async("MNG-1").await.unwrap_err().is_not_supported());
    assert!(session.get_project_keys_async().await.unwrap_err().is_not_supported());
  }
}
