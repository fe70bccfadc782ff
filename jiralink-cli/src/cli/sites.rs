//! # Sites Command
//!
//! Lists, adds and removes entries of `sites.toml`.

use std::path::Path;

use anyhow::{Result, bail};
use clap::{Args, Subcommand, ValueEnum};
use jiralink_core::output::format_site_name;
use jiralink_core::{Backend, ProbePolicy, Site, SiteConfig, SitesFile, load_sites_from, print_info, print_success};

use crate::connections::sites_path;

/// Command for managing sites
#[derive(Args)]
pub struct SitesArgs {
  /// The subcommand to execute
  #[command(subcommand)]
  pub subcommand: SitesSubcommands,
}

/// Wire protocol choices on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendArg {
  Legacy,
  Rest,
}

impl From<BackendArg> for Backend {
  fn from(arg: BackendArg) -> Self {
    match arg {
      BackendArg::Legacy => Backend::Legacy,
      BackendArg::Rest => Backend::Rest,
    }
  }
}

/// Subcommands for the sites command
#[derive(Subcommand)]
pub enum SitesSubcommands {
  /// List configured sites
  #[command(alias = "ls")]
  List,

  /// Add a site
  Add {
    /// Unique name of the site
    #[arg(required = true, index = 1)]
    name: String,

    /// Base URL of the Jira web application
    #[arg(required = true, index = 2)]
    url: String,

    /// Wire protocol to use
    #[arg(long, value_enum, default_value_t = BackendArg::Rest)]
    backend: BackendArg,

    /// Send credentials as HTTP basic auth instead of logging in (legacy only)
    #[arg(long)]
    http_auth: bool,

    /// Refuse to connect without credentials
    #[arg(long)]
    no_anonymous: bool,

    /// Regular expression matching the site's issue keys
    #[arg(long)]
    issue_pattern: Option<String>,

    /// Keep anonymous sessions whose server info probe is refused
    #[arg(long)]
    lenient_probe: bool,
  },

  /// Remove a site
  #[command(alias = "rm")]
  Remove {
    /// Name of the site to remove
    #[arg(required = true, index = 1)]
    name: String,
  },
}

pub fn handle_sites_command(args: SitesArgs, config: Option<&Path>) -> Result<()> {
  let path = sites_path(config)?;

  match args.subcommand {
    SitesSubcommands::List => list_sites(&load_sites_from(&path)?),
    SitesSubcommands::Add {
      name,
      url,
      backend,
      http_auth,
      no_anonymous,
      issue_pattern,
      lenient_probe,
    } => {
      let site_config = SiteConfig {
        name,
        url,
        backend: backend.into(),
        use_http_auth: http_auth,
        allow_anonymous: !no_anonymous,
        issue_pattern,
        probe: if lenient_probe {
          ProbePolicy::Lenient
        } else {
          ProbePolicy::Strict
        },
      };
      add_site(&path, site_config)
    }
    SitesSubcommands::Remove { name } => remove_site(&path, &name),
  }
}

#[allow(clippy::print_stdout)]
fn list_sites(sites: &SitesFile) -> Result<()> {
  if sites.sites.is_empty() {
    print_info("No Jira sites configured. Add one with 'jiralink sites add'");
    return Ok(());
  }

  for site in sites.build_sites()? {
    println!(
      "{} {} ({})",
      format_site_name(site.name()),
      site.url(),
      site.backend()
    );
  }
  Ok(())
}

/// Validate `config` and append it to the file at `path`
pub fn add_site(path: &Path, config: SiteConfig) -> Result<()> {
  let site = Site::from_config(&config)?;

  let mut sites = load_sites_from(path)?;
  if sites.sites.iter().any(|existing| existing.name == site.name()) {
    bail!("A site named '{}' already exists", site.name());
  }

  // store the normalized URL
  sites.sites.push(SiteConfig {
    name: site.name().to_string(),
    url: site.url().to_string(),
    ..config
  });
  jiralink_core::save_sites_to(path, &sites)?;

  print_success(&format!("Added site {} ({})", format_site_name(site.name()), site.url()));
  Ok(())
}

/// Remove the site named `name` from the file at `path`
pub fn remove_site(path: &Path, name: &str) -> Result<()> {
  let mut sites = load_sites_from(path)?;
  let before = sites.sites.len();
  sites.sites.retain(|site| site.name != name);

  if sites.sites.len() == before {
    bail!("No Jira site named '{name}' is configured");
  }

  jiralink_core::save_sites_to(path, &sites)?;
  print_success(&format!("Removed site {}", format_site_name(name)));
  Ok(())
}
