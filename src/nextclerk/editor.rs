//! Form state of the profile page.
//!
//! One editor is built per rendered view from the provider's user record.
//! It holds editable copies of the name fields, the password-change triplet
//! and the message shown after a submission. Submissions are forwarded to the
//! [`IdentityProvider`]; a failure only changes the message.

use secrecy::{ExposeSecret, SecretString};
use tracing::{error, info};

use crate::identity::{IdentityProvider, PasswordChange, ProfileUpdate, User};

pub const PROFILE_UPDATED: &str = "Profile updated successfully!";
pub const PROFILE_UPDATE_FAILED: &str = "Failed to update profile. Please try again.";
pub const PASSWORD_MISMATCH: &str = "New passwords do not match!";
pub const PASSWORD_UPDATED: &str = "Password updated successfully!";
pub const PASSWORD_UPDATE_FAILED: &str =
    "Failed to update password. Please check your current password and try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: &'static str,
}

impl Message {
    const fn success(text: &'static str) -> Self {
        Self {
            kind: MessageKind::Success,
            text,
        }
    }

    const fn error(text: &'static str) -> Self {
        Self {
            kind: MessageKind::Error,
            text,
        }
    }
}

/// Editable copy of the profile fields. `email` is display-only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&User> for ProfileForm {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone().unwrap_or_default(),
            last_name: user.last_name.clone().unwrap_or_default(),
            email: user.email.clone().unwrap_or_default(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PasswordForm {
    pub current_password: SecretString,
    pub new_password: SecretString,
    pub confirm_password: SecretString,
}

/// What happened to a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Succeeded,
    /// The provider call failed.
    Failed,
    /// Rejected locally; the provider was not called.
    Rejected,
    /// Not accepted: the form is closed or another submission is in flight.
    Ignored,
}

#[derive(Debug)]
pub struct ProfileEditor {
    user: User,
    form: ProfileForm,
    password: PasswordForm,
    is_editing: bool,
    show_password_form: bool,
    is_loading: bool,
    message: Option<Message>,
}

impl ProfileEditor {
    #[must_use]
    pub fn new(user: User) -> Self {
        Self {
            form: ProfileForm::from(&user),
            user,
            password: PasswordForm::default(),
            is_editing: false,
            show_password_form: false,
            is_loading: false,
            message: None,
        }
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn form(&self) -> &ProfileForm {
        &self.form
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.is_editing
    }

    #[must_use]
    pub fn show_password_form(&self) -> bool {
        self.show_password_form
    }

    /// True while a submission is in flight on this editor.
    ///
    /// The flag only guards a single editor instance. Handlers build one
    /// editor per request, so two separate form posts are not deduplicated
    /// here; the rendered forms disable their button on submit instead.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn start_editing(&mut self) {
        self.is_editing = true;
    }

    pub fn toggle_editing(&mut self) {
        self.is_editing = !self.is_editing;
    }

    pub fn open_password_form(&mut self) {
        self.show_password_form = true;
    }

    /// Close the password form and forget whatever was typed into it.
    pub fn cancel_password_form(&mut self) {
        self.show_password_form = false;
        self.password = PasswordForm::default();
    }

    /// Name inputs are disabled outside edit mode, so edits are dropped there.
    pub fn set_name(&mut self, first_name: String, last_name: String) {
        if !self.is_editing {
            return;
        }
        self.form.first_name = first_name;
        self.form.last_name = last_name;
    }

    pub fn set_passwords(&mut self, password: PasswordForm) {
        self.password = password;
    }

    // false when a submission is already running on this editor
    fn begin_submission(&mut self) -> bool {
        if self.is_loading {
            return false;
        }
        self.is_loading = true;
        self.message = None;
        true
    }

    /// Forward the name fields to the provider.
    ///
    /// Success leaves edit mode and reloads the form from the returned
    /// record; failure keeps edit mode and the typed values.
    pub async fn submit_profile(&mut self, provider: &dyn IdentityProvider) -> SubmitOutcome {
        if !self.is_editing || !self.begin_submission() {
            return SubmitOutcome::Ignored;
        }

        let update = ProfileUpdate {
            first_name: self.form.first_name.clone(),
            last_name: self.form.last_name.clone(),
        };

        let outcome = match provider.update_user(&self.user.id, &update).await {
            Ok(user) => {
                info!("Profile updated for {}", user.id);
                self.form = ProfileForm::from(&user);
                self.user = user;
                self.is_editing = false;
                self.message = Some(Message::success(PROFILE_UPDATED));
                SubmitOutcome::Succeeded
            }
            Err(err) => {
                error!("Failed to update profile for {}: {err:#}", self.user.id);
                self.message = Some(Message::error(PROFILE_UPDATE_FAILED));
                SubmitOutcome::Failed
            }
        };

        self.is_loading = false;
        outcome
    }

    /// Check new/confirm locally, then forward current and new password.
    pub async fn submit_password(&mut self, provider: &dyn IdentityProvider) -> SubmitOutcome {
        if !self.show_password_form || !self.begin_submission() {
            return SubmitOutcome::Ignored;
        }

        if self.password.new_password.expose_secret()
            != self.password.confirm_password.expose_secret()
        {
            self.message = Some(Message::error(PASSWORD_MISMATCH));
            self.is_loading = false;
            return SubmitOutcome::Rejected;
        }

        let change = PasswordChange {
            current_password: self.password.current_password.clone(),
            new_password: self.password.new_password.clone(),
        };

        let outcome = match provider.update_password(&self.user.id, &change).await {
            Ok(()) => {
                info!("Password updated for {}", self.user.id);
                self.message = Some(Message::success(PASSWORD_UPDATED));
                self.cancel_password_form();
                SubmitOutcome::Succeeded
            }
            Err(err) => {
                error!("Failed to update password for {}: {err:#}", self.user.id);
                self.message = Some(Message::error(PASSWORD_UPDATE_FAILED));
                SubmitOutcome::Failed
            }
        };

        self.is_loading = false;
        outcome
    }
}
