//! Sign-in, sign-up and sign-out.
//!
//! Credentials never touch this service: sign-in and sign-up hand the visitor
//! to the provider's hosted pages, sign-out revokes the session there and
//! clears the local cookie.

use axum::{
    extract::{Extension, Query, State},
    http::{
        header::{InvalidHeaderValue, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;

use super::current_session;
use crate::nextclerk::{
    gate::{
        site_url, CurrentSession, DASHBOARD_PATH, RETURN_PARAM, ROOT_PATH, SIGN_IN_PATH,
        SIGN_UP_PATH,
    },
    AppState, SiteConfig,
};

#[derive(Debug, Default, Deserialize)]
pub struct ReturnQuery {
    redirect_url: Option<String>,
}

/// Where to send the visitor after the provider's page. Only URLs on this
/// site are honoured; anything else falls back to the dashboard.
fn return_target(site: &SiteConfig, requested: Option<&str>) -> Url {
    let public_url = site.public_url();
    requested
        .filter(|value| !value.trim().is_empty())
        .and_then(|value| public_url.join(value).ok())
        .filter(|url| url.origin() == public_url.origin())
        .unwrap_or_else(|| site_url(public_url, DASHBOARD_PATH))
}

/// `page` resolved under the accounts URL, keeping any path prefix it has.
fn accounts_page(site: &SiteConfig, page: &str) -> Url {
    let accounts = site.accounts_url();
    let mut url = accounts
        .join(page.trim_start_matches('/'))
        .unwrap_or_else(|_| accounts.clone());
    url.set_query(None);
    url.set_fragment(None);
    url
}

fn hand_off(site: &SiteConfig, page: &str, query: &ReturnQuery) -> Response {
    let mut target = accounts_page(site, page);
    target.query_pairs_mut().append_pair(
        RETURN_PARAM,
        return_target(site, query.redirect_url.as_deref()).as_str(),
    );
    Redirect::temporary(target.as_str()).into_response()
}

pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReturnQuery>,
) -> Response {
    hand_off(state.site(), SIGN_IN_PATH, &query)
}

pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReturnQuery>,
) -> Response {
    hand_off(state.site(), SIGN_UP_PATH, &query)
}

pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<CurrentSession>>,
) -> Response {
    if let Some(session) = current_session(session) {
        match state.provider().revoke_session(&session.id).await {
            Ok(()) => info!("Signed out session {}", session.id),
            Err(err) => warn!("Failed to revoke session {}: {err:#}", session.id),
        }
    }

    // Always clear the cookie, even if the revoke failed.
    let mut headers = HeaderMap::new();
    match clear_session_cookie(state.site()) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build session cookie header: {err}"),
    }

    (headers, Redirect::to(ROOT_PATH)).into_response()
}

fn clear_session_cookie(site: &SiteConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        site.session_cookie()
    );
    if site.public_url().scheme() == "https" {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}
