//! Hosted identity service client (GoTrue-compatible `/auth/v1` API).
//!
//! Thin HTTP wrapper that keeps the current session in memory and publishes
//! an [`AuthEvent`] whenever it changes. Response parsing is split into pure
//! functions for testability.
//!
//! SESSION HANDLING
//! ================
//! The session is held behind a `std::sync::RwLock` that is never held across
//! an await. Expired access tokens are refreshed before `get_user`; a refresh
//! the service rejects ends the session locally.

#[cfg(test)]
#[path = "supabase_test.rs"]
mod supabase_test;

use std::sync::{PoisonError, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use tokio::sync::broadcast;

use super::gateway::AuthGateway;
use super::types::{AuthError, AuthEvent, RemoteUser, Session, UserMetadata};
use crate::config::{HttpTimeouts, LiveBackend};

const AUTH_PATH: &str = "/auth/v1";
const REFRESH_MARGIN_SECS: i64 = 30;
const EVENT_CAPACITY: usize = 16;

// =============================================================================
// CLIENT
// =============================================================================

pub struct SupabaseGateway {
    http: reqwest::Client,
    auth_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl SupabaseGateway {
    /// Build a client for the service at `backend.url`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(backend: &LiveBackend, timeouts: HttpTimeouts) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| AuthError::HttpClientBuild(e.to_string()))?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            http,
            auth_url: format!("{}{AUTH_PATH}", backend.url),
            anon_key: backend.anon_key.clone(),
            session: RwLock::new(None),
            events,
        })
    }

    /// Snapshot of the current session, for persistence.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reinstate a previously persisted session without contacting the service.
    pub fn restore_session(&self, session: Option<Session>) {
        self.set_session(session);
    }

    fn set_session(&self, session: Option<Session>) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    fn set_session_user(&self, user: &RemoteUser) {
        if let Some(session) = self
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            session.user = user.clone();
        }
    }

    fn emit(&self, event: AuthEvent) {
        tracing::debug!(?event, "auth state changed");
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn end_session(&self) {
        self.set_session(None);
        self.emit(AuthEvent::SignedOut);
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, AuthError> {
        let response = request
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            tracing::debug!(status, body = %text, "auth service returned error");
            return Err(AuthError::Rejected { status, message: parse_error_message(&text) });
        }
        Ok(text)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Option<Session>, AuthError> {
        let request = self
            .http
            .post(format!("{}/token?grant_type=refresh_token", self.auth_url))
            .bearer_auth(&self.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }));

        match self.send(request).await {
            Ok(text) => {
                let session = parse_session(&text, unix_now())?;
                self.set_session(Some(session.clone()));
                self.emit(AuthEvent::TokenRefreshed);
                Ok(Some(session))
            }
            Err(AuthError::Rejected { status: 400 | 401 | 403, message }) => {
                tracing::warn!(%message, "session refresh rejected; signing out locally");
                self.end_session();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait::async_trait]
impl AuthGateway for SupabaseGateway {
    async fn sign_up(&self, email: &str, password: &str, metadata: &UserMetadata) -> Result<RemoteUser, AuthError> {
        let request = self
            .http
            .post(format!("{}/signup", self.auth_url))
            .bearer_auth(&self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password, "data": metadata }));
        let text = self.send(request).await?;

        let outcome = parse_sign_up(&text, unix_now())?;
        let Some(session) = outcome.session else {
            tracing::info!(user_id = %outcome.user.id, "sign-up awaiting email confirmation");
            return Err(AuthError::ConfirmationRequired);
        };
        self.set_session(Some(session));
        self.emit(AuthEvent::SignedIn);
        Ok(outcome.user)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<RemoteUser, AuthError> {
        let request = self
            .http
            .post(format!("{}/token?grant_type=password", self.auth_url))
            .bearer_auth(&self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }));
        let text = self.send(request).await?;

        let session = parse_session(&text, unix_now())?;
        let user = session.user.clone();
        self.set_session(Some(session));
        self.emit(AuthEvent::SignedIn);
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.session() else {
            return Ok(());
        };
        let request = self
            .http
            .post(format!("{}/logout", self.auth_url))
            .bearer_auth(&session.access_token);

        match self.send(request).await {
            // An already-invalid token means the server has no session either.
            Ok(_) | Err(AuthError::Rejected { status: 401 | 403 | 404, .. }) => {
                self.end_session();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn get_user(&self) -> Result<Option<RemoteUser>, AuthError> {
        let Some(mut session) = self.session() else {
            return Ok(None);
        };
        if session.expires_within(unix_now(), REFRESH_MARGIN_SECS) {
            match self.refresh_session(&session.refresh_token).await? {
                Some(refreshed) => session = refreshed,
                None => return Ok(None),
            }
        }

        let request = self
            .http
            .get(format!("{}/user", self.auth_url))
            .bearer_auth(&session.access_token);
        match self.send(request).await {
            Ok(text) => {
                let user = parse_user(&text)?;
                self.set_session_user(&user);
                Ok(Some(user))
            }
            Err(AuthError::Rejected { status: 401 | 403, .. }) => {
                self.end_session();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn update_user(&self, metadata_patch: &UserMetadata) -> Result<RemoteUser, AuthError> {
        let session = self.session().ok_or(AuthError::NotAuthenticated)?;
        let request = self
            .http
            .put(format!("{}/user", self.auth_url))
            .bearer_auth(&session.access_token)
            .json(&serde_json::json!({ "data": metadata_patch }));
        let text = self.send(request).await?;

        let user = parse_user(&text)?;
        self.set_session_user(&user);
        self.emit(AuthEvent::UserUpdated);
        Ok(user)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: RemoteUser,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Result of a sign-up: the user, plus a session when no confirmation is required.
#[derive(Debug)]
struct SignUpOutcome {
    user: RemoteUser,
    session: Option<Session>,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_session(json: &str, now: i64) -> Result<Session, AuthError> {
    let token: TokenResponse = serde_json::from_str(json).map_err(|e| AuthError::Parse(e.to_string()))?;
    Ok(Session {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        token_type: token.token_type.unwrap_or_else(|| "bearer".to_owned()),
        expires_at: token
            .expires_at
            .or_else(|| token.expires_in.map(|secs| now + secs)),
        user: token.user,
    })
}

fn parse_user(json: &str) -> Result<RemoteUser, AuthError> {
    serde_json::from_str(json).map_err(|e| AuthError::Parse(e.to_string()))
}

fn parse_sign_up(json: &str, now: i64) -> Result<SignUpOutcome, AuthError> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(|e| AuthError::Parse(e.to_string()))?;
    if value.get("access_token").is_some() {
        let session = parse_session(json, now)?;
        return Ok(SignUpOutcome { user: session.user.clone(), session: Some(session) });
    }
    let user = serde_json::from_value(value).map_err(|e| AuthError::Parse(e.to_string()))?;
    Ok(SignUpOutcome { user, session: None })
}

/// First non-blank message field of an error body, or empty when none exists.
fn parse_error_message(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
        return String::new();
    };
    [parsed.msg, parsed.message, parsed.error_description, parsed.error]
        .into_iter()
        .flatten()
        .find(|m| !m.trim().is_empty())
        .unwrap_or_default()
}
