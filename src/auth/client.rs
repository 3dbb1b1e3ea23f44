//! Session client: live or offline identity backend, chosen once.
//!
//! DESIGN
//! ======
//! `SessionClient` is an enum that dispatches to [`SupabaseGateway`] or
//! [`FakeGateway`]. The choice is made at construction from
//! [`StorefrontConfig`], so no call site branches on configuration.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use tokio::sync::broadcast;

use super::fake::FakeGateway;
use super::gateway::AuthGateway;
use super::supabase::SupabaseGateway;
use super::types::{AuthError, AuthEvent, RemoteUser, Session, UserMetadata};
use crate::config::{BackendMode, StorefrontConfig};

pub enum SessionClient {
    Live(SupabaseGateway),
    Fake(FakeGateway),
}

impl SessionClient {
    /// Build the client selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the live HTTP client fails to build.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, AuthError> {
        match &config.backend {
            BackendMode::Live(backend) => {
                tracing::info!(url = %backend.url, "using hosted identity service");
                Ok(Self::Live(SupabaseGateway::new(backend, config.timeouts)?))
            }
            BackendMode::Fake => Ok(Self::Fake(FakeGateway::new())),
        }
    }

    #[must_use]
    pub fn is_fake(&self) -> bool {
        matches!(self, Self::Fake(_))
    }

    /// Current session, for persistence between runs.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        match self {
            Self::Live(c) => c.session(),
            Self::Fake(c) => c.session(),
        }
    }

    /// Reinstate a persisted session.
    pub fn restore_session(&self, session: Option<Session>) {
        match self {
            Self::Live(c) => c.restore_session(session),
            Self::Fake(c) => c.restore_session(session),
        }
    }

    fn gateway(&self) -> &dyn AuthGateway {
        match self {
            Self::Live(c) => c,
            Self::Fake(c) => c,
        }
    }
}

#[async_trait::async_trait]
impl AuthGateway for SessionClient {
    async fn sign_up(&self, email: &str, password: &str, metadata: &UserMetadata) -> Result<RemoteUser, AuthError> {
        self.gateway().sign_up(email, password, metadata).await
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<RemoteUser, AuthError> {
        self.gateway().sign_in_with_password(email, password).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.gateway().sign_out().await
    }

    async fn get_user(&self) -> Result<Option<RemoteUser>, AuthError> {
        self.gateway().get_user().await
    }

    async fn update_user(&self, metadata_patch: &UserMetadata) -> Result<RemoteUser, AuthError> {
        self.gateway().update_user(metadata_patch).await
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.gateway().subscribe()
    }
}
