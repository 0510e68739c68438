pub mod auth;
pub mod health;
pub mod me;
pub mod pages;
pub mod profile;

// common functions for the handlers
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use super::{gate::CurrentSession, views, AppState};
use crate::identity::{Session, User};

/// Session attached by the gate, if any.
pub(crate) fn current_session(extension: Option<Extension<CurrentSession>>) -> Option<Session> {
    extension.and_then(|Extension(current)| current.0)
}

pub(crate) fn html(status: StatusCode, body: String) -> Response {
    (status, Html(body)).into_response()
}

/// Load the session owner, or the page to show when the provider fails.
pub(crate) async fn load_user(state: &AppState, session: &Session) -> Result<User, Response> {
    state
        .provider()
        .get_user(&session.user_id)
        .await
        .map_err(|err| {
            error!("Failed to load user {}: {err:#}", session.user_id);
            html(StatusCode::BAD_GATEWAY, views::notice::unavailable())
        })
}
