//! # NextClerk
//!
//! `nextclerk` serves a landing page, a dashboard and a profile settings page
//! on top of a hosted identity provider. Sessions, credentials and user
//! records live at the provider; this service only reads them and forwards
//! mutations.
//!
//! ## Access control
//!
//! Every page request passes through the gate in [`nextclerk::gate`]. The
//! decision is a pure function of the normalized path and whether the
//! request carries an active session:
//!
//! - no session and a non-public path: redirect to `/sign-in?redirect_url=<original>`
//! - a session and the root path: redirect to `/dashboard`
//! - anything else: pass through
//!
//! ## Profile editing
//!
//! [`nextclerk::editor::ProfileEditor`] holds the form state of the profile
//! page. Name edits and password changes are forwarded to the
//! [`identity::IdentityProvider`]; failures become a generic message and are
//! never fatal.

pub mod cli;
pub mod identity;
pub mod nextclerk;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
