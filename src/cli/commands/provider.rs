use anyhow::{Context, Result};
use clap::{Arg, Command};
use secrecy::SecretString;

use crate::identity::session::DEFAULT_SESSION_COOKIE;

pub const ARG_PROVIDER_URL: &str = "provider-url";
pub const ARG_PROVIDER_SECRET_KEY: &str = "provider-secret-key";
pub const ARG_ACCOUNTS_URL: &str = "accounts-url";
pub const ARG_SESSION_COOKIE: &str = "session-cookie";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PROVIDER_URL)
                .long(ARG_PROVIDER_URL)
                .help("Identity provider backend API base URL, example: https://api.clerk.com")
                .env("NEXTCLERK_PROVIDER_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PROVIDER_SECRET_KEY)
                .long(ARG_PROVIDER_SECRET_KEY)
                .help("Identity provider secret key")
                .env("NEXTCLERK_PROVIDER_SECRET_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_ACCOUNTS_URL)
                .long(ARG_ACCOUNTS_URL)
                .help("Base URL of the provider-hosted sign-in and sign-up pages")
                .env("NEXTCLERK_ACCOUNTS_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIE)
                .long(ARG_SESSION_COOKIE)
                .help("Name of the cookie carrying the session token")
                .env("NEXTCLERK_SESSION_COOKIE")
                .default_value(DEFAULT_SESSION_COOKIE),
        )
}

#[derive(Debug)]
pub struct Options {
    pub url: String,
    pub secret_key: SecretString,
    pub accounts_url: String,
    pub session_cookie: String,
}

impl Options {
    /// # Errors
    /// Returns an error if a required provider argument is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let url = matches
            .get_one::<String>(ARG_PROVIDER_URL)
            .cloned()
            .context("missing required argument: --provider-url")?;
        let secret_key = matches
            .get_one::<String>(ARG_PROVIDER_SECRET_KEY)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --provider-secret-key")?;
        let accounts_url = matches
            .get_one::<String>(ARG_ACCOUNTS_URL)
            .cloned()
            .context("missing required argument: --accounts-url")?;
        let session_cookie = matches
            .get_one::<String>(ARG_SESSION_COOKIE)
            .cloned()
            .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_string());

        Ok(Self {
            url,
            secret_key,
            accounts_url,
            session_cookie,
        })
    }
}
