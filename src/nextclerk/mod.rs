#![allow(clippy::needless_for_each)]

use crate::{
    identity::{session::DEFAULT_SESSION_COOKIE, IdentityProvider},
    nextclerk::handlers::{auth, health, me, pages, profile},
};
use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;

pub mod editor;
pub mod gate;
pub(crate) mod handlers;
mod openapi;
pub mod views;

pub use openapi::openapi;

/// Site-wide settings shared by the gate and the handlers.
#[derive(Clone, Debug)]
pub struct SiteConfig {
    public_url: Url,
    accounts_url: Url,
    session_cookie: String,
    policy: gate::AccessPolicy,
}

impl SiteConfig {
    #[must_use]
    pub fn new(public_url: Url, accounts_url: Url) -> Self {
        Self {
            public_url,
            accounts_url,
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            policy: gate::AccessPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_session_cookie(mut self, session_cookie: String) -> Self {
        self.session_cookie = session_cookie;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: gate::AccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn public_url(&self) -> &Url {
        &self.public_url
    }

    #[must_use]
    pub fn accounts_url(&self) -> &Url {
        &self.accounts_url
    }

    #[must_use]
    pub fn session_cookie(&self) -> &str {
        &self.session_cookie
    }

    #[must_use]
    pub fn policy(&self) -> &gate::AccessPolicy {
        &self.policy
    }
}

pub struct AppState {
    site: SiteConfig,
    provider: Arc<dyn IdentityProvider>,
}

impl AppState {
    #[must_use]
    pub fn new(site: SiteConfig, provider: Arc<dyn IdentityProvider>) -> Self {
        Self { site, provider }
    }

    #[must_use]
    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    #[must_use]
    pub fn provider(&self) -> &dyn IdentityProvider {
        self.provider.as_ref()
    }
}

/// Build the application router.
///
/// Pages and the fallback sit behind the gate; `/health` and the `OpenAPI`
/// document do not.
pub fn router(state: Arc<AppState>) -> Router {
    let pages = Router::new()
        .route(gate::ROOT_PATH, get(pages::landing))
        .route(gate::DASHBOARD_PATH, get(pages::dashboard))
        .route(
            gate::PROFILE_PATH,
            get(profile::show).post(profile::update),
        )
        .route(
            profile::PASSWORD_PATH,
            get(profile::password_form).post(profile::change_password),
        )
        .route(gate::SIGN_IN_PATH, get(auth::sign_in))
        .route(gate::SIGN_UP_PATH, get(auth::sign_up))
        .route("/sign-out", post(auth::sign_out))
        .route("/api/me", get(me::me))
        .fallback(pages::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), gate::enforce));

    let open = Router::new()
        .route("/health", get(health::health).options(health::health))
        .route("/api-docs/openapi.json", get(openapi_json));

    pages
        .merge(open)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span)),
        )
        .with_state(state)
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, state: Arc<AppState>) -> Result<()> {
    let app = router(state);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Gracefully shutdown");
            }
        })
        .await?;

    Ok(())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
