//! Test utilities shared across the jiralink workspace
//!
//! This crate provides common testing infrastructure including:
//! - Temporary home directories holding a `.netrc` file ([`NetrcGuard`])
//! - Temporary `sites.toml` configuration files ([`SitesFileGuard`])
//!
//! The clippy dead_code lint is disabled for this crate because test utilities
//! may not be used by all tests, and the compiler cannot detect usage across
//! crate boundaries in development dependencies.

#![allow(dead_code)]

pub mod netrc;
pub mod sites;

// Re-export commonly used items
pub use netrc::NetrcGuard;
pub use sites::SitesFileGuard;
