use std::path::Path;

use anyhow::Result;
use clap::Args;
use jiralink_core::{print_info, print_warning};
use jiralink_session::MailAddressResolver;

use crate::connections::{create_runtime, load_connections_from_netrc};

/// Command for resolving a username to an email address
#[derive(Args)]
pub struct EmailArgs {
  /// The CI / Jira username to look up
  #[arg(required = true, index = 1)]
  pub username: String,
}

#[allow(clippy::print_stdout)]
pub fn handle_email_command(args: EmailArgs, config: Option<&Path>) -> Result<()> {
  let connections = load_connections_from_netrc(config)?;
  if connections.is_empty() {
    print_warning("No Jira sites configured. Add one with 'jiralink sites add'");
    return Ok(());
  }

  let rt = create_runtime()?;
  let resolver = MailAddressResolver::new(connections);

  match rt.block_on(resolver.find_mail_address_for(&args.username)) {
    Some(email) => println!("{email}"),
    None => print_info(&format!("No site has an email address for {}", args.username)),
  }

  Ok(())
}
