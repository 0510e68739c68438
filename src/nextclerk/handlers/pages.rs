use axum::{
    extract::{Extension, State},
    http::{StatusCode, Uri},
    response::Response,
};
use std::sync::Arc;

use super::{current_session, html, load_user};
use crate::nextclerk::{gate::CurrentSession, views, AppState};

pub async fn landing(session: Option<Extension<CurrentSession>>) -> Response {
    let signed_in = current_session(session).is_some();
    html(StatusCode::OK, views::landing::render(signed_in))
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<CurrentSession>>,
    uri: Uri,
) -> Response {
    let Some(session) = current_session(session) else {
        return html(StatusCode::OK, views::notice::signed_out(uri.path()));
    };

    match load_user(&state, &session).await {
        Ok(user) => html(StatusCode::OK, views::dashboard::render(&user)),
        Err(response) => response,
    }
}

pub async fn not_found(session: Option<Extension<CurrentSession>>) -> Response {
    let signed_in = current_session(session).is_some();
    html(StatusCode::NOT_FOUND, views::notice::not_found(signed_in))
}
