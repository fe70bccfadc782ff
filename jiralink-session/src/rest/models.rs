//! Response shapes of the REST v2 resources, mapped onto the shared models.

use serde::Deserialize;

use crate::models::{Component, Issue, Project, Version};

/// Represents a Jira user resource
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestUser {
  pub name: String,
  #[serde(default)]
  pub email_address: Option<String>,
}

/// Represents a Jira issue resource
#[derive(Debug, Deserialize)]
pub struct RestIssue {
  pub id: String,
  pub key: String,
  pub fields: RestIssueFields,
}

/// Represents Jira issue fields
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestIssueFields {
  #[serde(default)]
  pub summary: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub project: Option<RestProject>,
  #[serde(default)]
  pub assignee: Option<RestUser>,
  #[serde(default)]
  pub issuetype: Option<RestNamed>,
  #[serde(default)]
  pub status: Option<RestNamed>,
  #[serde(default)]
  pub fix_versions: Vec<Version>,
  #[serde(default)]
  pub components: Vec<Component>,
}

/// Any resource reduced to its id and name
#[derive(Debug, Deserialize)]
pub struct RestNamed {
  pub id: String,
  #[allow(dead_code)]
  pub name: String,
}

/// Represents a Jira project resource
#[derive(Debug, Deserialize)]
pub struct RestProject {
  pub id: String,
  pub key: String,
  #[serde(default)]
  pub name: Option<String>,
}

impl From<RestProject> for Project {
  fn from(project: RestProject) -> Self {
    Self {
      id: Some(project.id),
      key: project.key,
      name: project.name,
    }
  }
}

impl From<RestIssue> for Issue {
  fn from(issue: RestIssue) -> Self {
    let fields = issue.fields;
    Self {
      id: Some(issue.id),
      key: issue.key,
      project: fields.project.map(|p| p.key),
      summary: fields.summary,
      description: fields.description,
      assignee: fields.assignee.map(|a| a.name),
      issue_type: fields.issuetype.map(|t| t.id),
      status: fields.status.map(|s| s.id),
      fix_versions: fields.fix_versions,
      components: fields.components,
    }
  }
}
