//! Identity provider contract.
//!
//! The provider owns users, sessions and credentials. This module defines the
//! read-only view of those records that the pages need and the handful of
//! remote operations the service calls.

#[cfg(test)]
pub(crate) mod fake;
pub mod http;
pub mod session;

pub use self::http::HttpIdentityProvider;
pub use self::session::session_token;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;
use utoipa::ToSchema;

/// A live session as reported by the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub user_id: String,
}

/// Current view of a user record.
#[derive(Clone, Debug, Default, Serialize, ToSchema)]
pub struct User {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl User {
    /// First and last name joined by a space, if either is set.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Name fields sent on profile update. Email is not part of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
}

/// Current and new password for a password change.
#[derive(Clone, Debug)]
pub struct PasswordChange {
    pub current_password: SecretString,
    pub new_password: SecretString,
}

/// Remote operations consumed from the identity provider.
///
/// Every call is opaque: it either succeeds or fails, and callers decide how
/// a failure is surfaced.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a session token. `Ok(None)` means the token is unknown,
    /// expired or the session is no longer active.
    async fn verify_session(&self, token: &str) -> Result<Option<Session>>;

    async fn get_user(&self, user_id: &str) -> Result<User>;

    async fn update_user(&self, user_id: &str, update: &ProfileUpdate) -> Result<User>;

    async fn update_password(&self, user_id: &str, change: &PasswordChange) -> Result<()>;

    async fn revoke_session(&self, session_id: &str) -> Result<()>;
}
