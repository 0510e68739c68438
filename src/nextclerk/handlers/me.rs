//! JSON view of the signed-in user.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::error;

use super::current_session;
use crate::identity::User;
use crate::nextclerk::{gate::CurrentSession, AppState};

#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Return the signed-in user.", body = User),
        (status = 401, description = "No active session."),
        (status = 502, description = "Identity provider failed."),
    ),
    tag = "me"
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<CurrentSession>>,
) -> impl IntoResponse {
    let Some(session) = current_session(session) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    match state.provider().get_user(&session.user_id).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => {
            error!("Failed to fetch /api/me user: {err:#}");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}
