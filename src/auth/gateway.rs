//! The remote identity service seam.
//!
//! DESIGN
//! ======
//! `AuthStore` only talks to `dyn AuthGateway`. Production code plugs in a
//! [`SessionClient`](super::client::SessionClient); tests plug in scripted
//! mocks so store transitions can be checked without HTTP.

use tokio::sync::broadcast;

use super::types::{AuthError, AuthEvent, RemoteUser, UserMetadata};

/// Operations exposed by the hosted identity service.
///
/// The gateway owns the session token; callers only see user records.
#[async_trait::async_trait]
pub trait AuthGateway: Send + Sync {
    /// Create a principal and start a session for it.
    ///
    /// Returns [`AuthError::ConfirmationRequired`] when the account exists but
    /// no session was issued, so a returned user always has a live session.
    async fn sign_up(&self, email: &str, password: &str, metadata: &UserMetadata) -> Result<RemoteUser, AuthError>;

    /// Start a session with email and password.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<RemoteUser, AuthError>;

    /// End the current session.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The user behind the current session, or `None` when signed out.
    async fn get_user(&self) -> Result<Option<RemoteUser>, AuthError>;

    /// Merge `metadata_patch` into the signed-in user's metadata.
    async fn update_user(&self, metadata_patch: &UserMetadata) -> Result<RemoteUser, AuthError>;

    /// Session change notifications.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
