use anyhow::Result;
use clap::Args;
use jiralink_core::{print_error, print_success};
use jiralink_session::check_legacy_url;

use crate::connections::create_runtime;

/// Command for checking a legacy Jira URL
#[derive(Args)]
pub struct CheckUrlArgs {
  /// Base URL of the Jira instance
  #[arg(index = 1)]
  pub url: Option<String>,
}

pub fn handle_check_url_command(args: CheckUrlArgs) -> Result<()> {
  let rt = create_runtime()?;
  let check = rt.block_on(check_legacy_url(args.url.as_deref()));

  if check.is_ok() {
    print_success(&check.to_string());
  } else {
    print_error(&check.to_string());
  }

  Ok(())
}
