//! Profile settings page.
//!
//! Rendered from a [`ProfileEditor`]: its flags choose between read-only and
//! edit mode, whether the password form is open and whether submit buttons
//! are disabled. The email input is always disabled; it is never part of a
//! submission.
//!
//! A fresh editor is built per request, so `is_loading` is false whenever a
//! page is rendered. Both forms also disable their submit button in the
//! browser once submitted, showing the button's `data-busy` label.

use super::{escape, format_date, layout};
use crate::nextclerk::editor::{MessageKind, ProfileEditor};

const FALLBACK_INITIAL: &str = "U";
const FALLBACK_NAME: &str = "User";
const ACCOUNT_TYPE: &str = "Personal Account";

/// Disables the submit button and swaps in its `data-busy` label.
const DISABLE_ON_SUBMIT: &str = "var b=this.querySelector('button[type=submit]');if(b.disabled)return false;b.disabled=true;b.textContent=b.dataset.busy;";

#[must_use]
pub fn render(editor: &ProfileEditor) -> String {
    let body = format!(
        r#"      <section class="profile">
        <h1>Profile settings</h1>
{message}{header}{details}{security}      </section>"#,
        message = message(editor),
        header = header(editor),
        details = details(editor),
        security = security(editor),
    );

    layout("Profile", true, &body)
}

fn message(editor: &ProfileEditor) -> String {
    editor.message().map_or_else(String::new, |message| {
        let class = match message.kind {
            MessageKind::Success => "message success",
            MessageKind::Error => "message error",
        };
        format!(
            "        <p class=\"{class}\" role=\"status\">{}</p>\n",
            escape(message.text)
        )
    })
}

fn avatar(editor: &ProfileEditor) -> String {
    let user = editor.user();
    if let Some(image_url) = user.image_url.as_deref().filter(|url| !url.is_empty()) {
        return format!(
            r#"<img class="avatar" src="{}" alt="Profile image">"#,
            escape(image_url)
        );
    }

    let initial = [user.first_name.as_deref(), user.email.as_deref()]
        .into_iter()
        .flatten()
        .find_map(|value| value.trim().chars().next())
        .map_or_else(
            || FALLBACK_INITIAL.to_string(),
            |c| c.to_uppercase().to_string(),
        );

    format!(r#"<span class="avatar">{}</span>"#, escape(&initial))
}

fn header(editor: &ProfileEditor) -> String {
    let user = editor.user();
    let name = user.full_name().unwrap_or_else(|| FALLBACK_NAME.to_string());

    format!(
        r#"        <div class="profile-header">
          {avatar}
          <h2>{name}</h2>
          <p>{email}</p>
          <p>Member since: {created}</p>
          <p>Last sign-in: {last_sign_in}</p>
          <p>Account Type: {ACCOUNT_TYPE}</p>
        </div>
"#,
        avatar = avatar(editor),
        name = escape(&name),
        email = escape(user.email.as_deref().unwrap_or_default()),
        created = format_date(user.created_at.as_ref()),
        last_sign_in = format_date(user.last_sign_in_at.as_ref()),
    )
}

fn disabled(flag: bool) -> &'static str {
    if flag {
        " disabled"
    } else {
        ""
    }
}

fn details(editor: &ProfileEditor) -> String {
    let form = editor.form();
    let editing = editor.is_editing();
    let inputs_disabled = disabled(!editing);

    let actions = if editing {
        format!(
            r#"          <button type="submit" data-busy="Saving..."{}>{}</button>
          <a href="/profile">Cancel</a>"#,
            disabled(editor.is_loading()),
            if editor.is_loading() {
                "Saving..."
            } else {
                "Save changes"
            },
        )
    } else {
        r#"          <a class="button" href="/profile?edit=true">Edit profile</a>"#.to_string()
    };

    format!(
        r#"        <form class="profile-form" method="post" action="/profile" onsubmit="{DISABLE_ON_SUBMIT}">
          <label for="first_name">First name</label>
          <input id="first_name" name="first_name" type="text" value="{first_name}"{inputs_disabled}>
          <label for="last_name">Last name</label>
          <input id="last_name" name="last_name" type="text" value="{last_name}"{inputs_disabled}>
          <label for="email">Email</label>
          <input id="email" type="email" value="{email}" disabled>
{actions}
        </form>
"#,
        first_name = escape(&form.first_name),
        last_name = escape(&form.last_name),
        email = escape(&form.email),
    )
}

fn security(editor: &ProfileEditor) -> String {
    if !editor.show_password_form() {
        return r#"        <div class="security">
          <h2>Security</h2>
          <a class="button" href="/profile?password=true">Change password</a>
        </div>
"#
        .to_string();
    }

    format!(
        r#"        <div class="security">
          <h2>Security</h2>
          <form class="password-form" method="post" action="/profile/password" onsubmit="{DISABLE_ON_SUBMIT}">
            <label for="current_password">Current password</label>
            <input id="current_password" name="current_password" type="password" autocomplete="current-password" required>
            <label for="new_password">New password</label>
            <input id="new_password" name="new_password" type="password" autocomplete="new-password" minlength="8" required>
            <label for="confirm_password">Confirm new password</label>
            <input id="confirm_password" name="confirm_password" type="password" autocomplete="new-password" minlength="8" required>
            <button type="submit" data-busy="Updating..."{}>{}</button>
            <a href="/profile">Cancel</a>
          </form>
        </div>
"#,
        disabled(editor.is_loading()),
        if editor.is_loading() {
            "Updating..."
        } else {
            "Update password"
        },
    )
}
