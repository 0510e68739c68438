//! In-memory provider for unit tests.

use super::{IdentityProvider, PasswordChange, ProfileUpdate, Session, User};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeProvider {
    sessions: HashMap<String, Session>,
    users: Mutex<HashMap<String, User>>,
    passwords: Mutex<HashMap<String, String>>,
    fail_session_lookup: bool,
    fail_mutations: bool,
    session_calls: AtomicUsize,
    update_user_calls: AtomicUsize,
    update_password_calls: AtomicUsize,
    revoke_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `user` with an active session reachable through `token`.
    pub fn with_session(mut self, token: &str, session_id: &str, user: User) -> Self {
        self.sessions.insert(
            token.to_string(),
            Session {
                id: session_id.to_string(),
                user_id: user.id.clone(),
            },
        );
        if let Ok(mut users) = self.users.lock() {
            users.insert(user.id.clone(), user);
        }
        self
    }

    pub fn with_password(self, user_id: &str, password: &str) -> Self {
        if let Ok(mut passwords) = self.passwords.lock() {
            passwords.insert(user_id.to_string(), password.to_string());
        }
        self
    }

    pub fn failing_session_lookup(mut self) -> Self {
        self.fail_session_lookup = true;
        self
    }

    pub fn failing_mutations(mut self) -> Self {
        self.fail_mutations = true;
        self
    }

    pub fn session_calls(&self) -> usize {
        self.session_calls.load(Ordering::SeqCst)
    }

    pub fn update_user_calls(&self) -> usize {
        self.update_user_calls.load(Ordering::SeqCst)
    }

    pub fn update_password_calls(&self) -> usize {
        self.update_password_calls.load(Ordering::SeqCst)
    }

    pub fn revoke_calls(&self) -> usize {
        self.revoke_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn verify_session(&self, token: &str) -> Result<Option<Session>> {
        self.session_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_session_lookup {
            return Err(anyhow!("session lookup unavailable"));
        }
        Ok(self.sessions.get(token).cloned())
    }

    async fn get_user(&self, user_id: &str) -> Result<User> {
        let users = self.users.lock().map_err(|_| anyhow!("poisoned"))?;
        users
            .get(user_id)
            .cloned()
            .ok_or_else(|| anyhow!("user {user_id} not found"))
    }

    async fn update_user(&self, user_id: &str, update: &ProfileUpdate) -> Result<User> {
        self.update_user_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_mutations {
            return Err(anyhow!("update rejected"));
        }
        let mut users = self.users.lock().map_err(|_| anyhow!("poisoned"))?;
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| anyhow!("user {user_id} not found"))?;
        user.first_name = Some(update.first_name.clone());
        user.last_name = Some(update.last_name.clone());
        Ok(user.clone())
    }

    async fn update_password(&self, user_id: &str, change: &PasswordChange) -> Result<()> {
        self.update_password_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_mutations {
            return Err(anyhow!("update rejected"));
        }
        let mut passwords = self.passwords.lock().map_err(|_| anyhow!("poisoned"))?;
        match passwords.get(user_id) {
            Some(current) if current == change.current_password.expose_secret() => {
                passwords.insert(
                    user_id.to_string(),
                    change.new_password.expose_secret().to_string(),
                );
                Ok(())
            }
            _ => Err(anyhow!("current password is incorrect")),
        }
    }

    async fn revoke_session(&self, _session_id: &str) -> Result<()> {
        self.revoke_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
