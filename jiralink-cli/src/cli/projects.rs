use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use jiralink_core::output::format_site_name;
use jiralink_core::{print_error, print_info};
use jiralink_session::InteractionSession;

use crate::connections::{create_runtime, load_connections_from_netrc, select_connection};

/// Command for listing project keys
#[derive(Args)]
pub struct ProjectsArgs {
  /// Site to ask (defaults to the first configured site)
  #[arg(long, short = 's')]
  pub site: Option<String>,
}

/// Sorted, upper-case project keys from whichever lookup the backend offers
pub async fn fetch_project_keys(session: &dyn InteractionSession) -> jiralink_session::Result<Vec<String>> {
  let mut keys: Vec<String> = match session.get_project_keys().await {
    Ok(keys) => keys.into_iter().collect(),
    Err(e) if e.is_not_supported() => session
      .get_project_keys_async()
      .await?
      .into_iter()
      .map(|project| project.key.to_uppercase())
      .collect(),
    Err(e) => return Err(e),
  };
  keys.sort();
  keys.dedup();
  Ok(keys)
}

#[allow(clippy::print_stdout)]
pub fn handle_projects_command(args: ProjectsArgs, config: Option<&Path>) -> Result<()> {
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

  let keys = rt
    .block_on(fetch_project_keys(session.as_ref()))
    .with_context(|| format!("Failed to list projects of {}", connection.site().name()))?;

  if keys.is_empty() {
    print_info("No projects visible");
  }
  for key in keys {
    println!("{key}");
  }

  Ok(())
}
