//! Domain models shared by both backends.
//!
//! Field names follow the legacy wire structs (camelCase), so the legacy
//! backend decodes into these types directly. The REST backend maps its own
//! response shapes onto them in `rest::models`.

use jiralink_core::Credentials;
use serde::{Deserialize, Serialize};

/// Represents Jira authentication credentials
#[derive(Clone)]
pub struct JiraAuth {
  pub username: String,
  pub api_token: String,
}

impl From<&Credentials> for JiraAuth {
  fn from(credentials: &Credentials) -> Self {
    Self {
      username: credentials.username.clone(),
      api_token: credentials.password.clone(),
    }
  }
}

/// Represents a Jira issue
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
  #[serde(default)]
  pub id: Option<String>,
  pub key: String,
  #[serde(default)]
  pub project: Option<String>,
  #[serde(default)]
  pub summary: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub assignee: Option<String>,
  #[serde(default, rename = "type")]
  pub issue_type: Option<String>,
  /// Status id; resolve the name with `get_status_by_id`
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub fix_versions: Vec<Version>,
  #[serde(default)]
  pub components: Vec<Component>,
}

/// Payload for creating an issue on the legacy backend
#[derive(Debug, Serialize)]
pub(crate) struct NewIssue<'a> {
  pub project: String,
  pub summary: &'a str,
  pub description: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub assignee: Option<&'a str>,
  #[serde(rename = "type")]
  pub issue_type: &'a str,
  pub components: &'a [Component],
}

/// A project version; releasing one is an explicit action, not a field edit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Version {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub released: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewVersion<'a> {
  pub name: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Component {
  pub id: String,
  pub name: String,
}

/// Represents a Jira issue status
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Status {
  pub id: String,
  pub name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IssueType {
  pub id: String,
  pub name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Group {
  pub name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Role {
  pub id: i64,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
}

/// A workflow transition that can be performed on an issue
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WorkflowAction {
  pub id: String,
  pub name: String,
}

/// A comment, optionally restricted to a group or a project role
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
  pub body: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub group_level: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub role_level: Option<String>,
}

impl Comment {
  pub fn new(body: &str) -> Self {
    Self {
      body: body.to_string(),
      group_level: None,
      role_level: None,
    }
  }
}

/// A field update: the field id and its new values
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldValue {
  pub id: String,
  pub values: Vec<String>,
}

impl FieldValue {
  pub fn new(id: &str, values: Vec<String>) -> Self {
    Self {
      id: id.to_string(),
      values,
    }
  }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct User {
  pub name: String,
  #[serde(default)]
  pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Project {
  #[serde(default)]
  pub id: Option<String>,
  pub key: String,
  #[serde(default)]
  pub name: Option<String>,
}

/// Server metadata, fetched right after connecting to prove the session works
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
  pub version: String,
  #[serde(default)]
  pub base_url: Option<String>,
  #[serde(default)]
  pub server_title: Option<String>,
}
