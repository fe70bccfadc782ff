//! # Command Line Interface
//!
//! Defines the CLI structure and command handlers for the jiralink tool.

mod check_url;
mod email;
pub mod issue;
mod projects;
mod sites;

use std::path::PathBuf;

use anyhow::Result;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{ArgAction, Parser, Subcommand};
use jiralink_core::ColorMode;

/// Top-level CLI command for the jiralink tool
#[derive(Parser)]
#[command(name = "jiralink")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(about = "Talk to Jira sites from CI through the legacy RPC or REST API")]
#[command(
  long_about = "jiralink connects a CI server to one or more Jira sites.\n\n\
        Sites are listed in sites.toml and authenticated from your .netrc file.\n\
        Each site speaks either the legacy token-based RPC API or the REST API;\n\
        commands work with both and report when a backend lacks a capability."
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
#[command(subcommand_required(true))]
#[command(disable_help_subcommand = true)]
#[command(max_term_width = 120)]
#[command(styles = Styles::styled()
    .header(AnsiColor::BrightGreen.on_default().bold().underline())
    .usage(AnsiColor::Green.on_default().bold())
    .literal(AnsiColor::BrightGreen.on_default().bold())
    .placeholder(AnsiColor::BrightWhite.on_default().italic())
    .valid(AnsiColor::Green.on_default())
    .invalid(AnsiColor::BrightRed.on_default().bold())
)]
pub struct Cli {
  /// Sets the level of verbosity (can be used multiple times)
  #[arg(
    short = 'v',
    long = "verbose",
    action = ArgAction::Count,
    global = true,
    long_help = "Sets the level of verbosity for tracing and logging output.\n\n\
             -v: Show info level messages\n\
             -vv: Show debug level messages\n\
             -vvv: Show trace level messages"
  )]
  pub verbose: u8,

  /// Controls when colored output is used
  #[arg(
    long,
    value_enum,
    ignore_case = true,
    global = true,
    default_value_t = ColorMode::Auto,
  )]
  pub colors: ColorMode,

  /// Path to sites.toml (defaults to the platform config directory)
  #[arg(long, global = true, value_name = "PATH")]
  pub config: Option<PathBuf>,

  /// Subcommands
  #[command(subcommand)]
  pub command: Commands,
}

/// Subcommands for the jiralink tool
#[derive(Subcommand)]
pub enum Commands {
  /// Check that a URL serves Jira with the legacy remote API enabled
  #[command(long_about = "Check a Jira URL before configuring it as a legacy site.\n\n\
            Fetches the front page to confirm it is Jira, then the legacy service\n\
            description to confirm the remote API is switched on.")]
  CheckUrl(check_url::CheckUrlArgs),

  /// Add a comment to an issue
  #[command(long_about = "Add a comment to a Jira issue.\n\n\
            Visibility can be restricted to a group and/or a project role. Restrictions\n\
            naming a group or role the site does not know are dropped and the comment\n\
            is posted anyway. Requires a legacy site.")]
  Comment(issue::CommentArgs),

  /// Find the email address of a user across all sites
  #[command(long_about = "Look a username up on every configured site, in order.\n\n\
            The first site that knows an address for the user wins. Masked addresses\n\
            such as 'john dot doe at example dot com' are unmasked.")]
  Email(email::EmailArgs),

  /// Show a Jira issue
  #[command(long_about = "Show the details of a Jira issue.\n\n\
            Identifiers that do not match the site's issue key pattern are reported\n\
            without contacting the site.")]
  Issue(issue::IssueArgs),

  /// List the project keys of a site
  Projects(projects::ProjectsArgs),

  /// Manage configured Jira sites
  #[command(arg_required_else_help = true)]
  Sites(sites::SitesArgs),
}

pub fn handle_cli(cli: Cli) -> Result<()> {
  cli.colors.apply();
  let config = cli.config.as_deref();

  match cli.command {
    Commands::CheckUrl(args) => check_url::handle_check_url_command(args),
    Commands::Comment(args) => issue::handle_comment_command(args, config),
    Commands::Email(args) => email::handle_email_command(args, config),
    Commands::Issue(args) => issue::handle_issue_command(args, config),
    Commands::Projects(args) => projects::handle_projects_command(args, config),
    Commands::Sites(args) => sites::handle_sites_command(args, config),
  }
}
