//! Offline identity backend used when service credentials are not configured.
//!
//! Fabricates user records locally so the storefront stays usable without a
//! live project. Every call logs a warning so the degraded mode is visible.

#[cfg(test)]
#[path = "fake_test.rs"]
mod fake_test;

use std::sync::{Mutex, PoisonError};

use tokio::sync::broadcast;

use super::gateway::AuthGateway;
use super::types::{AuthError, AuthEvent, METADATA_FULL_NAME, RemoteUser, Session, UserMetadata};

pub const FAKE_USER_ID: &str = "mock-id";
pub const FAKE_DISPLAY_NAME: &str = "Mock User";
pub const FAKE_EMAIL: &str = "mock@example.com";
const FAKE_ACCESS_TOKEN: &str = "mock-access-token";
const FAKE_REFRESH_TOKEN: &str = "mock-refresh-token";

/// In-memory stand-in for the identity service.
pub struct FakeGateway {
    current: Mutex<Option<RemoteUser>>,
    // Kept so `subscribe` has a live sender; the fake never publishes.
    events: broadcast::Sender<AuthEvent>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGateway {
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(1);
        Self { current: Mutex::new(None), events }
    }

    /// Pseudo-session for the fabricated user so the view layer can persist it.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.current_user().map(|user| Session {
            access_token: FAKE_ACCESS_TOKEN.to_owned(),
            refresh_token: FAKE_REFRESH_TOKEN.to_owned(),
            token_type: "bearer".to_owned(),
            expires_at: None,
            user,
        })
    }

    pub fn restore_session(&self, session: Option<Session>) {
        self.set_current(session.map(|s| s.user));
    }

    fn current_user(&self) -> Option<RemoteUser> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_current(&self, user: Option<RemoteUser>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = user;
    }
}

fn fake_user(email: &str, metadata: UserMetadata) -> RemoteUser {
    RemoteUser { id: FAKE_USER_ID.to_owned(), email: Some(email.to_owned()), phone: None, user_metadata: metadata }
}

fn warn_fake(operation: &str) {
    tracing::warn!(operation, "identity service not configured; using fabricated users");
}

#[async_trait::async_trait]
impl AuthGateway for FakeGateway {
    async fn sign_up(&self, email: &str, _password: &str, metadata: &UserMetadata) -> Result<RemoteUser, AuthError> {
        warn_fake("sign_up");
        let user = fake_user(email, metadata.clone());
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in_with_password(&self, email: &str, _password: &str) -> Result<RemoteUser, AuthError> {
        warn_fake("sign_in_with_password");
        let mut metadata = UserMetadata::new();
        metadata.insert(METADATA_FULL_NAME.to_owned(), FAKE_DISPLAY_NAME.into());
        let user = fake_user(email, metadata);
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        warn_fake("sign_out");
        self.set_current(None);
        Ok(())
    }

    async fn get_user(&self) -> Result<Option<RemoteUser>, AuthError> {
        Ok(self.current_user())
    }

    async fn update_user(&self, metadata_patch: &UserMetadata) -> Result<RemoteUser, AuthError> {
        warn_fake("update_user");
        let mut user = self
            .current_user()
            .unwrap_or_else(|| fake_user(FAKE_EMAIL, UserMetadata::new()));
        for (key, value) in metadata_patch {
            user.user_metadata.insert(key.clone(), value.clone());
        }
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
