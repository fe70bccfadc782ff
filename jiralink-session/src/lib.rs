//! # jiralink Sessions
//!
//! One capability interface, [`InteractionSession`], over two ways of talking
//! to Jira: the token-based legacy RPC API ([`LegacySession`]) and the REST
//! API ([`ModernSession`]). [`create_session`] picks the backend a site is
//! configured for; [`MailAddressResolver`] uses sessions to map CI users to
//! email addresses.

pub mod connection;
pub mod consts;
pub mod error;
pub mod factory;
pub mod legacy;
pub mod mail;
pub mod models;
pub mod rest;
pub mod session;
mod status_cache;
pub mod url_check;

pub use connection::SiteConnection;
pub use error::{Result, SessionError};
pub use factory::{SharedSession, create_session};
pub use legacy::LegacySession;
pub use mail::{MailAddressResolver, unmask_email};
pub use models::{
  Comment, Component, FieldValue, Group, Issue, IssueType, Project, Role, ServerInfo, Status, User, Version,
  WorkflowAction,
};
pub use rest::ModernSession;
pub use session::{Deferred, InteractionSession};
pub use url_check::{UrlCheck, check_legacy_url};
