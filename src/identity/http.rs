use super::{IdentityProvider, PasswordChange, ProfileUpdate, Session, User};
use crate::{cli::globals::GlobalArgs, APP_USER_AGENT};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const REQUEST_TIMEOUT_SECONDS: u64 = 10;
const ACTIVE_SESSION_STATUS: &str = "active";

/// Identity provider reached over its backend HTTP API.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    base_url: Url,
    secret_key: SecretString,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    user_id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct EmailAddressResponse {
    id: String,
    email_address: String,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    image_url: Option<String>,
    primary_email_address_id: Option<String>,
    #[serde(default)]
    email_addresses: Vec<EmailAddressResponse>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    last_sign_in_at: Option<DateTime<Utc>>,
}

impl From<UserResponse> for User {
    fn from(response: UserResponse) -> Self {
        let email = response.primary_email_address_id.as_deref().and_then(|id| {
            response
                .email_addresses
                .iter()
                .find(|address| address.id == id)
                .map(|address| address.email_address.clone())
        });

        Self {
            id: response.id,
            first_name: response.first_name,
            last_name: response.last_name,
            email,
            image_url: response.image_url.filter(|url| !url.is_empty()),
            created_at: response.created_at,
            last_sign_in_at: response.last_sign_in_at,
        }
    }
}

impl HttpIdentityProvider {
    /// Build a client for the provider API rooted at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL cannot be used as a base or the HTTP client cannot be built.
    pub fn new(base_url: &str, secret_key: SecretString) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid provider URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Provider URL cannot be a base: {base_url}"));
        }

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()
            .context("Failed to build provider HTTP client")?;

        Ok(Self {
            base_url,
            secret_key,
            client,
        })
    }

    /// # Errors
    /// Returns an error if the provider URL in `globals` is invalid.
    pub fn from_globals(globals: &GlobalArgs) -> Result<Self> {
        Self::new(&globals.provider_url, globals.provider_secret_key.clone())
    }

    fn endpoint_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("Provider URL cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(self.secret_key.expose_secret())
    }

    async fn user_from(response: Response, url: &Url) -> Result<User> {
        if !response.status().is_success() {
            return Err(error_from(response, url).await);
        }

        let user: UserResponse = response
            .json()
            .await
            .with_context(|| format!("{url} - invalid user payload"))?;

        Ok(user.into())
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[instrument(skip(self, token))]
    async fn verify_session(&self, token: &str) -> Result<Option<Session>> {
        let url = self.endpoint_url(&["v1", "sessions", "verify"])?;

        let response = self
            .request(Method::POST, url.clone())
            .json(&json!({ "token": token }))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let session: SessionResponse = response
                    .json()
                    .await
                    .with_context(|| format!("{url} - invalid session payload"))?;

                if session.status == ACTIVE_SESSION_STATUS {
                    Ok(Some(Session {
                        id: session.id,
                        user_id: session.user_id,
                    }))
                } else {
                    debug!("session {} is {}", session.id, session.status);
                    Ok(None)
                }
            }
            StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => {
                debug!("session token rejected: {}", response.status());
                Ok(None)
            }
            _ => Err(error_from(response, &url).await),
        }
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: &str) -> Result<User> {
        let url = self.endpoint_url(&["v1", "users", user_id])?;

        let response = self.request(Method::GET, url.clone()).send().await?;

        Self::user_from(response, &url).await
    }

    #[instrument(skip(self))]
    async fn update_user(&self, user_id: &str, update: &ProfileUpdate) -> Result<User> {
        let url = self.endpoint_url(&["v1", "users", user_id])?;

        let response = self
            .request(Method::PATCH, url.clone())
            .json(update)
            .send()
            .await?;

        Self::user_from(response, &url).await
    }

    #[instrument(skip(self, change))]
    async fn update_password(&self, user_id: &str, change: &PasswordChange) -> Result<()> {
        // The provider only rotates the password after the current one checks out.
        let verify_url = self.endpoint_url(&["v1", "users", user_id, "verify_password"])?;

        let response = self
            .request(Method::POST, verify_url.clone())
            .json(&json!({ "password": change.current_password.expose_secret() }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from(response, &verify_url).await);
        }

        let url = self.endpoint_url(&["v1", "users", user_id])?;

        let response = self
            .request(Method::PATCH, url.clone())
            .json(&json!({ "password": change.new_password.expose_secret() }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from(response, &url).await);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn revoke_session(&self, session_id: &str) -> Result<()> {
        let url = self.endpoint_url(&["v1", "sessions", session_id, "revoke"])?;

        let response = self.request(Method::POST, url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(error_from(response, &url).await);
        }

        Ok(())
    }
}

/// Turn a non-success provider response into an error carrying the first
/// message from its `errors` array, when there is one.
async fn error_from(response: Response, url: &Url) -> anyhow::Error {
    let status = response.status();
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| {
            body["errors"][0]["message"]
                .as_str()
                .map(ToString::to_string)
        })
        .unwrap_or_default();

    anyhow!("{url} - {status}, {message}")
}
