//! Profile page and its two form submissions.
//!
//! Each request builds a fresh [`ProfileEditor`] from the provider's user
//! record, applies the query toggles or the submitted form, and renders it.

use axum::{
    extract::{Extension, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use secrecy::SecretString;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::{current_session, html, load_user};
use crate::nextclerk::{
    editor::{PasswordForm, ProfileEditor},
    gate::{CurrentSession, PROFILE_PATH},
    views, AppState,
};

pub const PASSWORD_PATH: &str = "/profile/password";

/// Profile page with the password form open.
const PASSWORD_FORM_URL: &str = "/profile?password=true";

#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    #[serde(default)]
    edit: bool,
    #[serde(default)]
    password: bool,
}

#[derive(Debug, Deserialize)]
pub struct NameForm {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
}

#[derive(Deserialize)]
pub struct PasswordInput {
    #[serde(default)]
    current_password: String,
    #[serde(default)]
    new_password: String,
    #[serde(default)]
    confirm_password: String,
}

impl From<PasswordInput> for PasswordForm {
    fn from(input: PasswordInput) -> Self {
        Self {
            current_password: SecretString::from(input.current_password),
            new_password: SecretString::from(input.new_password),
            confirm_password: SecretString::from(input.confirm_password),
        }
    }
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<CurrentSession>>,
    Query(query): Query<ProfileQuery>,
    uri: Uri,
) -> Response {
    let Some(session) = current_session(session) else {
        return html(StatusCode::OK, views::notice::signed_out(uri.path()));
    };

    let mut editor = match load_user(&state, &session).await {
        Ok(user) => ProfileEditor::new(user),
        Err(response) => return response,
    };

    if query.edit {
        editor.start_editing();
    }
    if query.password {
        editor.open_password_form();
    }

    html(StatusCode::OK, views::profile::render(&editor))
}

/// `GET /profile/password` lands on the profile page with the form open, so
/// a sign-in that started from a password submission has somewhere to return.
pub async fn password_form() -> Response {
    Redirect::to(PASSWORD_FORM_URL).into_response()
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<CurrentSession>>,
    Form(input): Form<NameForm>,
) -> Response {
    let Some(session) = current_session(session) else {
        return html(
            StatusCode::UNAUTHORIZED,
            views::notice::signed_out(PROFILE_PATH),
        );
    };

    let mut editor = match load_user(&state, &session).await {
        Ok(user) => ProfileEditor::new(user),
        Err(response) => return response,
    };

    editor.start_editing();
    editor.set_name(input.first_name, input.last_name);

    let outcome = editor.submit_profile(state.provider()).await;
    debug!("Profile submission for {}: {outcome:?}", session.user_id);

    html(StatusCode::OK, views::profile::render(&editor))
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<CurrentSession>>,
    Form(input): Form<PasswordInput>,
) -> Response {
    let Some(session) = current_session(session) else {
        return html(
            StatusCode::UNAUTHORIZED,
            views::notice::signed_out(PROFILE_PATH),
        );
    };

    let mut editor = match load_user(&state, &session).await {
        Ok(user) => ProfileEditor::new(user),
        Err(response) => return response,
    };

    editor.open_password_form();
    editor.set_passwords(input.into());

    let outcome = editor.submit_password(state.provider()).await;
    debug!("Password submission for {}: {outcome:?}", session.user_id);

    html(StatusCode::OK, views::profile::render(&editor))
}
