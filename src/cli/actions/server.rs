use crate::{
    cli::{globals::GlobalArgs, telemetry},
    identity::HttpIdentityProvider,
    nextclerk::{self, gate::AccessPolicy, AppState, SiteConfig},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub public_url: Url,
    pub strict_routes: bool,
    pub provider_url: String,
    pub provider_secret_key: SecretString,
    pub accounts_url: Url,
    pub session_cookie: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the provider client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let mut globals = GlobalArgs::new(args.provider_url);
    globals.set_secret_key(args.provider_secret_key);

    debug!("Global args: {:?}", globals);

    let provider = HttpIdentityProvider::from_globals(&globals)
        .context("Could not build identity provider client")?;

    let policy = if args.strict_routes {
        AccessPolicy::strict()
    } else {
        AccessPolicy::default()
    };

    let site = SiteConfig::new(args.public_url, args.accounts_url)
        .with_session_cookie(args.session_cookie)
        .with_policy(policy);

    let state = Arc::new(AppState::new(site, Arc::new(provider)));

    let result = nextclerk::new(args.port, state).await;

    telemetry::shutdown_tracer();

    result
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("public_url", args.public_url.to_string()),
        ("provider_url", args.provider_url.clone()),
        ("accounts_url", args.accounts_url.to_string()),
        ("session_cookie", args.session_cookie.clone()),
        ("strict_routes", args.strict_routes.to_string()),
    ];

    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = String::from("Startup configuration:");
    for (key, value) in &entries {
        message.push_str(&format!("\n  {key:<max_key_len$} : {value}"));
    }

    info!("{message}");
}
