//! # Issue Commands
//!
//! Viewing issues and commenting on them. Viewing works on both backends:
//! when the synchronous lookup is not supported the deferred one is awaited
//! instead.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use jiralink_core::output::{format_issue_key, format_site_name};
use jiralink_core::{print_error, print_info, print_success, print_warning};
use jiralink_session::{InteractionSession, Issue, SessionError};
use owo_colors::OwoColorize;

use crate::connections::{create_runtime, load_connections_from_netrc, select_connection};

/// Command for viewing an issue
#[derive(Args)]
pub struct IssueArgs {
  /// The Jira issue key (e.g., MNG-1235)
  #[arg(required = true, index = 1)]
  pub issue_key: String,

  /// Site to ask (defaults to the first configured site)
  #[arg(long, short = 's')]
  pub site: Option<String>,
}

/// Command for commenting on an issue
#[derive(Args)]
pub struct CommentArgs {
  /// The Jira issue key (e.g., MNG-1235)
  #[arg(required = true, index = 1)]
  pub issue_key: String,

  /// The comment text
  #[arg(required = true, index = 2)]
  pub body: String,

  /// Restrict visibility to this group
  #[arg(long)]
  pub group: Option<String>,

  /// Restrict visibility to this project role
  #[arg(long)]
  pub role: Option<String>,

  /// Site to post to (defaults to the first configured site)
  #[arg(long, short = 's')]
  pub site: Option<String>,
}

/// Fetch an issue, falling back to the deferred lookup on backends without a
/// synchronous one
pub async fn fetch_issue(session: &dyn InteractionSession, issue_key: &str) -> jiralink_session::Result<Option<Issue>> {
  if !session.exists_issue(issue_key) {
    return Ok(None);
  }

  match session.get_issue(issue_key).await {
    Err(e) if e.is_not_supported() => session.get_issue_async(issue_key).await,
    other => other,
  }
}

pub fn handle_issue_command(args: IssueArgs, config: Option<&Path>) -> Result<()> {
  let connections = load_connections_from_netrc(config)?;
  let connection = select_connection(&connections, args.site.as_deref())?;
  let rt = create_runtime()?;

  let Some(session) = rt.block_on(connection.session())? else {
    print_error(&format!(
      "Could not connect to {}",
      format_site_name(connection.site().name())
    ));
    return Ok(());
  };

  if !session.exists_issue(&args.issue_key) {
    print_warning(&format!(
      "'{}' is not an issue key on {}",
      args.issue_key,
      connection.site().name()
    ));
    return Ok(());
  }

  let issue = rt
    .block_on(fetch_issue(session.as_ref(), &args.issue_key))
    .with_context(|| format!("Failed to fetch issue {}", args.issue_key))?;

  match issue {
    Some(issue) => display_issue(&issue),
    None => print_info(&format!("Issue {} not found", format_issue_key(&args.issue_key))),
  }

  Ok(())
}

#[allow(clippy::print_stdout)]
fn display_issue(issue: &Issue) {
  println!("{} {}", format_issue_key(&issue.key), issue.summary.bold());
  if let Some(project) = &issue.project {
    println!("  Project:  {project}");
  }
  if let Some(status) = &issue.status {
    println!("  Status:   {status}");
  }
  if let Some(assignee) = &issue.assignee {
    println!("  Assignee: {assignee}");
  }
  if !issue.fix_versions.is_empty() {
    let versions: Vec<&str> = issue.fix_versions.iter().map(|v| v.name.as_str()).collect();
    println!("  Fix versions: {}", versions.join(", "));
  }
  if let Some(description) = issue.description.as_deref().filter(|d| !d.is_empty()) {
    println!();
    println!("{description}");
  }
}

pub fn handle_comment_command(args: CommentArgs, config: Option<&Path>) -> Result<()> {
  let connections = load_connections_from_netrc(config)?;
  let connection = select_connection(&connections, args.site.as_deref())?;
  let rt = create_runtime()?;

  let Some(session) = rt.block_on(connection.session())? else {
    print_error(&format!(
      "Could not connect to {}",
      format_site_name(connection.site().name())
    ));
    return Ok(());
  };

  let result = rt.block_on(session.add_comment(
    &args.issue_key,
    &args.body,
    args.group.as_deref(),
    args.role.as_deref(),
  ));

  match result {
    Ok(()) => print_success(&format!("Commented on {}", format_issue_key(&args.issue_key))),
    Err(e @ SessionError::NotSupported { .. }) => print_error(&format!(
      "{}: {e}",
      format_site_name(connection.site().name())
    )),
    Err(e) => return Err(e).with_context(|| format!("Failed to comment on {}", args.issue_key)),
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use jiralink_core::Site;
  use jiralink_session::ModernSession;
  use serde_json::json;
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  use super::*;

  #[tokio::test]
  async fn test_fetch_issue_falls_back_to_deferred_lookup() -> Result<()> {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/rest/api/2/issue/MNG-1235"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
          "id": "10000",
          "key": "MNG-1235",
          "fields": { "summary": "Broken build" }
      })))
      .expect(1)
      .mount(&mock_server)
      .await;

    let site = Arc::new(Site::new("test", &mock_server.uri())?);
    let session = ModernSession::new(site, None)?;

    let issue = fetch_issue(&session, "MNG-1235").await?.expect("issue");
    assert_eq!(issue.summary, "Broken build");

    Ok(())
  }

  #[tokio::test]
  async fn test_fetch_issue_skips_non_keys() -> Result<()> {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(500))
      .expect(0)
      .mount(&mock_server)
      .await;

    let site = Arc::new(Site::new("test", &mock_server.uri())?);
    let session = ModernSession::new(site, None)?;
    assert!(fetch_issue(&session, "not-an-id").await?.is_none());

    Ok(())
  }
}
