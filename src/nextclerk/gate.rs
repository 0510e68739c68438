//! Access-control gate.
//!
//! Flow Overview:
//! 1) Skip static files, they are never gated.
//! 2) Resolve the request's session token at the provider. A failed lookup
//!    counts as "no session".
//! 3) Classify the normalized path against the public allow-list and either
//!    redirect or let the request through with the session attached.

use axum::{
    extract::{Request, State},
    http::{Method, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use super::AppState;
use crate::identity::{session_token, Session};

pub const ROOT_PATH: &str = "/";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const PROFILE_PATH: &str = "/profile";
pub const SIGN_IN_PATH: &str = "/sign-in";
pub const SIGN_UP_PATH: &str = "/sign-up";

/// Query parameter carrying the URL to return to after signing in.
pub const RETURN_PARAM: &str = "redirect_url";

/// Paths reachable without a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessPolicy {
    public: BTreeSet<&'static str>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::from_paths(&[
            ROOT_PATH,
            PROFILE_PATH,
            DASHBOARD_PATH,
            SIGN_IN_PATH,
            SIGN_UP_PATH,
        ])
    }
}

impl AccessPolicy {
    /// Allow-list without `/profile` and `/dashboard`, so the gate itself
    /// keeps signed-out visitors away from them.
    #[must_use]
    pub fn strict() -> Self {
        Self::from_paths(&[ROOT_PATH, SIGN_IN_PATH, SIGN_UP_PATH])
    }

    fn from_paths(paths: &[&'static str]) -> Self {
        Self {
            public: paths.iter().copied().collect(),
        }
    }

    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public.contains(normalize_path(path).as_str())
    }

    pub fn public_paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.public.iter().copied()
    }
}

/// Outcome of the gate for one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Redirect to sign-in, carrying the original URL.
    SignIn,
    /// Signed-in visitor hit the root; send them to the dashboard.
    Dashboard,
    Continue,
}

/// Session resolved by the gate, available to handlers as an extension.
#[derive(Clone, Debug, Default)]
pub struct CurrentSession(pub Option<Session>);

impl CurrentSession {
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.0.as_ref()
    }
}

/// Collapse repeated slashes and drop trailing ones. The root stays `/`.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        ROOT_PATH.to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Path prefixes that are always gated, whatever they end with.
pub const API_PREFIXES: [&str; 2] = ["/api", "/trpc"];

/// Requests for static files (`/favicon.ico`, `/assets/app.css`) bypass the
/// gate; API paths never do.
#[must_use]
pub fn is_gated(path: &str) -> bool {
    if API_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return true;
    }

    // at least one character before the final `.`, word characters after it
    let rest = path.strip_prefix('/').unwrap_or(path);
    let is_static_file = rest.rsplit_once('.').is_some_and(|(before, ext)| {
        !before.is_empty()
            && !ext.is_empty()
            && ext.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    });
    !is_static_file
}

/// GET and HEAD can be replayed against the sign-in page; anything else is
/// sent there with 303 so the browser switches to GET.
fn sign_in_redirect(method: &Method, target: &Url) -> Redirect {
    if *method == Method::GET || *method == Method::HEAD {
        Redirect::temporary(target.as_str())
    } else {
        Redirect::to(target.as_str())
    }
}

#[must_use]
pub fn decide(policy: &AccessPolicy, path: &str, authenticated: bool) -> Decision {
    if !authenticated && !policy.is_public(path) {
        return Decision::SignIn;
    }

    if authenticated && normalize_path(path) == ROOT_PATH {
        return Decision::Dashboard;
    }

    Decision::Continue
}

/// Absolute URL of the request as seen by the visitor.
#[must_use]
pub fn original_url(public_url: &Url, uri: &Uri) -> Url {
    // set_path keeps the host even for `//other.host/...` request paths
    let mut url = public_url.clone();
    url.set_path(uri.path());
    url.set_query(uri.query());
    url.set_fragment(None);
    url
}

/// `<public>/sign-in?redirect_url=<original>`
#[must_use]
pub fn sign_in_url(public_url: &Url, original: &Url) -> Url {
    let mut url = site_url(public_url, SIGN_IN_PATH);
    url.query_pairs_mut()
        .append_pair(RETURN_PARAM, original.as_str());
    url
}

/// Absolute URL of a site path.
#[must_use]
pub fn site_url(public_url: &Url, path: &str) -> Url {
    let mut url = public_url.join(path).unwrap_or_else(|_| public_url.clone());
    url.set_query(None);
    url.set_fragment(None);
    url
}

async fn resolve_session(state: &AppState, token: Option<String>) -> Option<Session> {
    let token = token?;

    match state.provider().verify_session(&token).await {
        Ok(session) => session,
        Err(err) => {
            warn!("Session lookup failed, treating request as signed out: {err:#}");
            None
        }
    }
}

/// Middleware applying the gate to every routed request.
pub async fn enforce(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let method = request.method().clone();

    if !is_gated(&path) {
        return next.run(request).await;
    }

    let token = session_token(request.headers(), state.site().session_cookie());
    let session = resolve_session(&state, token).await;
    let site = state.site();

    match decide(site.policy(), &path, session.is_some()) {
        Decision::SignIn => {
            let original = original_url(site.public_url(), request.uri());
            let target = sign_in_url(site.public_url(), &original);
            debug!("No session for {method} {path}, redirecting to sign-in");
            sign_in_redirect(&method, &target).into_response()
        }
        Decision::Dashboard => {
            let target = site_url(site.public_url(), DASHBOARD_PATH);
            Redirect::temporary(target.as_str()).into_response()
        }
        Decision::Continue => {
            request.extensions_mut().insert(CurrentSession(session));
            next.run(request).await
        }
    }
}
