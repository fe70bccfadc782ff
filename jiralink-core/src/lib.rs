//! # jiralink Core Library
//!
//! Shared building blocks for the jiralink crates: the [`Site`] a session is
//! bound to, credential lookup, config directories and terminal output
//! helpers. Nothing in here talks to Jira; the session crate does that.

pub mod config;
pub mod creds;
pub mod output;
pub mod site;
pub mod url;

// Re-export main types
pub use config::{ConfigDirs, SitesFile, load_sites_from, save_sites_to};
pub use creds::{CredentialStore, Credentials};
pub use output::{ColorMode, print_error, print_info, print_success, print_warning};
pub use site::{Backend, ProbePolicy, Site, SiteConfig, SiteError};
