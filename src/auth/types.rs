//! Auth types: profile, remote user and session records, events, errors.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// Free-form `user_metadata` map as stored by the identity service.
pub type UserMetadata = serde_json::Map<String, serde_json::Value>;

pub const METADATA_FULL_NAME: &str = "full_name";
pub const METADATA_AVATAR_URL: &str = "avatar_url";
pub const METADATA_PHONE: &str = "phone";

/// Shown for transport and parse failures; raw details only go to the log.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";
pub const NOT_AUTHENTICATED_MESSAGE: &str = "No authenticated user";
pub const CONFIRMATION_REQUIRED_MESSAGE: &str = "Check your email to confirm your account, then sign in.";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by gateway calls and store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// An operation that needs a signed-in user ran without one.
    #[error("no authenticated user")]
    NotAuthenticated,

    /// Sign-up created the account but no session until the email is confirmed.
    #[error("account created; email confirmation required")]
    ConfirmationRequired,

    /// The identity service rejected the request with a message.
    #[error("auth service rejected request (status {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The HTTP request could not be completed.
    #[error("auth request failed: {0}")]
    Request(String),

    /// The response body could not be deserialized.
    #[error("auth response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl AuthError {
    /// Stable machine-readable code for logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "E_NOT_AUTHENTICATED",
            Self::ConfirmationRequired => "E_CONFIRMATION_REQUIRED",
            Self::Rejected { .. } => "E_AUTH_REJECTED",
            Self::Request(_) => "E_AUTH_REQUEST",
            Self::Parse(_) => "E_AUTH_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    /// Human-readable text safe to show in the UI.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAuthenticated => NOT_AUTHENTICATED_MESSAGE.to_owned(),
            Self::ConfirmationRequired => CONFIRMATION_REQUIRED_MESSAGE.to_owned(),
            Self::Rejected { message, .. } if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_ERROR_MESSAGE.to_owned(),
        }
    }
}

// =============================================================================
// REMOTE RECORDS
// =============================================================================

/// User record as returned by the identity service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// A signed-in session: tokens plus the user they belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Expiry as Unix seconds, when known.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: RemoteUser,
}

fn default_token_type() -> String {
    "bearer".to_owned()
}

impl Session {
    /// Whether the access token expires within `margin_secs` of `now`.
    #[must_use]
    pub fn expires_within(&self, now: i64, margin_secs: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now + margin_secs)
    }
}

/// Notification published whenever the remote session changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    UserUpdated,
    TokenRefreshed,
}

// =============================================================================
// PROFILE
// =============================================================================

/// The signed-in principal as the storefront knows it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl UserProfile {
    /// Normalize a remote user record into the local profile shape.
    #[must_use]
    pub fn from_remote(user: &RemoteUser) -> Self {
        let phone = metadata_str(&user.user_metadata, METADATA_PHONE).or_else(|| {
            user.phone
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .map(str::to_owned)
        });
        Self {
            id: user.id.clone(),
            email: user.email.clone().unwrap_or_default(),
            display_name: metadata_str(&user.user_metadata, METADATA_FULL_NAME).unwrap_or_default(),
            avatar_url: metadata_str(&user.user_metadata, METADATA_AVATAR_URL),
            phone,
        }
    }
}

fn metadata_str(metadata: &UserMetadata, key: &str) -> Option<String> {
    metadata
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
}

/// Optional profile fields to merge into the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ProfilePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.phone.is_none()
    }

    /// Metadata keys sent to the identity service for this patch.
    #[must_use]
    pub fn to_metadata(&self) -> UserMetadata {
        let mut metadata = UserMetadata::new();
        if let Some(name) = &self.display_name {
            metadata.insert(METADATA_FULL_NAME.to_owned(), name.clone().into());
        }
        if let Some(phone) = &self.phone {
            metadata.insert(METADATA_PHONE.to_owned(), phone.clone().into());
        }
        metadata
    }
}
