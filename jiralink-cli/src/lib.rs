//! # jiralink CLI Library
//!
//! Command definitions and the glue that turns `sites.toml` plus `.netrc`
//! into ready-to-use site connections.

pub mod cli;
pub mod connections;
