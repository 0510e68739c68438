//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action the binary executes.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{provider, ARG_PORT, ARG_PUBLIC_URL, ARG_STRICT_ROUTES};
use anyhow::{anyhow, Context, Result};
use url::Url;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or a URL is malformed.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let public_url = matches
        .get_one::<String>(ARG_PUBLIC_URL)
        .context("missing required argument: --public-url")
        .and_then(|url| parse_base_url(url, "--public-url"))?;

    let strict_routes = matches.get_flag(ARG_STRICT_ROUTES);

    let provider_opts = provider::Options::parse(matches)?;
    parse_base_url(&provider_opts.url, "--provider-url")?;
    let accounts_url = parse_base_url(&provider_opts.accounts_url, "--accounts-url")?;

    Ok(Action::Server(Args {
        port,
        public_url,
        strict_routes,
        provider_url: provider_opts.url,
        provider_secret_key: provider_opts.secret_key,
        accounts_url,
        session_cookie: provider_opts.session_cookie,
    }))
}

fn parse_base_url(value: &str, arg: &str) -> Result<Url> {
    let url = Url::parse(value).with_context(|| format!("invalid {arg}: {value}"))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(anyhow!("invalid {arg}: {value} must be an absolute http(s) URL"));
    }
    Ok(url)
}
