//! Auth state store: the cached signed-in profile and request lifecycles.
//!
//! ARCHITECTURE
//! ============
//! `AuthStore` is constructed explicitly around a gateway and owned by the
//! application (no global). State lives in a `watch` channel: every
//! transition is applied with `send_modify`, so readers always see a
//! consistent [`AuthSnapshot`] and views can `subscribe` to re-render.
//!
//! REQUEST LIFECYCLES
//! ==================
//! Each operation has its own `Idle -> Pending -> Succeeded | Failed` slot.
//! Every dispatch takes a monotonically increasing request id:
//! - an operation's slot only accepts the outcome of its latest request;
//! - the profile only accepts writes newer than the last applied write, so a
//!   slow response never overwrites the result of a later dispatch.
//!
//! The profile is a cache of the remote session's identity; the gateway owns
//! the session itself.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use super::gateway::AuthGateway;
use super::types::{AuthError, METADATA_FULL_NAME, ProfilePatch, UserMetadata, UserProfile};
use super::validation::{Credentials, Registration};

// =============================================================================
// LIFECYCLE TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthOperation {
    FetchCurrentUser,
    Login,
    Register,
    Logout,
    UpdateProfile,
}

impl AuthOperation {
    pub const ALL: [Self; 5] = [Self::FetchCurrentUser, Self::Login, Self::Register, Self::Logout, Self::UpdateProfile];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FetchCurrentUser => "fetch_current_user",
            Self::Login => "login",
            Self::Register => "register",
            Self::Logout => "logout",
            Self::UpdateProfile => "update_profile",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestPhase {
    #[default]
    Idle,
    Pending,
    Succeeded,
    /// Carries the user-facing message.
    Failed(String),
}

impl RequestPhase {
    fn is_settled(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }
}

/// Lifecycle of one operation's most recent request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationState {
    pub phase: RequestPhase,
    /// Id of the latest dispatch; 0 when never dispatched.
    pub request_id: u64,
}

/// Consistent view of the store at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub profile: Option<UserProfile>,
    operations: [OperationState; 5],
    profile_request: u64,
}

impl AuthSnapshot {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.profile.is_some()
    }

    /// Whether any operation is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.operations
            .iter()
            .any(|op| op.phase == RequestPhase::Pending)
    }

    #[must_use]
    pub fn operation(&self, op: AuthOperation) -> &OperationState {
        &self.operations[op.index()]
    }

    /// Failure message of the most recently dispatched operation that has
    /// settled. A later success hides an earlier failure.
    #[must_use]
    pub fn latest_error(&self) -> Option<&str> {
        let latest = self
            .operations
            .iter()
            .filter(|op| op.phase.is_settled())
            .max_by_key(|op| op.request_id)?;
        match &latest.phase {
            RequestPhase::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

// =============================================================================
// STORE
// =============================================================================

pub struct AuthStore {
    gateway: Arc<dyn AuthGateway>,
    state: watch::Sender<AuthSnapshot>,
    next_request: AtomicU64,
}

impl AuthStore {
    #[must_use]
    pub fn new(gateway: Arc<dyn AuthGateway>) -> Self {
        let (state, _) = watch::channel(AuthSnapshot::default());
        Self { gateway, state, next_request: AtomicU64::new(1) }
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver notified after every state transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn profile(&self) -> Option<UserProfile> {
        self.state.borrow().profile.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    #[must_use]
    pub fn latest_error(&self) -> Option<String> {
        self.state.borrow().latest_error().map(str::to_owned)
    }

    #[must_use]
    pub fn operation(&self, op: AuthOperation) -> OperationState {
        self.state.borrow().operation(op).clone()
    }

    /// Clear every recorded failure (the error banner was dismissed).
    pub fn dismiss_error(&self) {
        self.state.send_modify(|state| {
            for op in &mut state.operations {
                if matches!(op.phase, RequestPhase::Failed(_)) {
                    op.phase = RequestPhase::Idle;
                }
            }
        });
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Refresh the profile from the active session; `None` when signed out.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the cached profile is left untouched.
    pub async fn fetch_current_user(&self) -> Result<Option<UserProfile>, AuthError> {
        let op = AuthOperation::FetchCurrentUser;
        let id = self.begin(op);
        match self.gateway.get_user().await {
            Ok(user) => {
                let profile = user.as_ref().map(UserProfile::from_remote);
                self.succeed(op, id, profile.clone());
                Ok(profile)
            }
            Err(e) => Err(self.fail(op, id, e)),
        }
    }

    /// Sign in with validated credentials.
    ///
    /// # Errors
    ///
    /// Returns the gateway error (e.g. invalid credentials); the profile is
    /// left as it was.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile, AuthError> {
        let op = AuthOperation::Login;
        let id = self.begin(op);
        match self
            .gateway
            .sign_in_with_password(credentials.email(), credentials.password())
            .await
        {
            Ok(user) => {
                let profile = UserProfile::from_remote(&user);
                self.succeed(op, id, Some(profile.clone()));
                Ok(profile)
            }
            Err(e) => Err(self.fail(op, id, e)),
        }
    }

    /// Create an account and sign in to it.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the profile is left as it was.
    pub async fn register(&self, registration: &Registration) -> Result<UserProfile, AuthError> {
        let op = AuthOperation::Register;
        let id = self.begin(op);
        let mut metadata = UserMetadata::new();
        metadata.insert(METADATA_FULL_NAME.to_owned(), registration.full_name().into());

        let credentials = registration.credentials();
        match self
            .gateway
            .sign_up(credentials.email(), credentials.password(), &metadata)
            .await
        {
            Ok(user) => {
                let profile = UserProfile::from_remote(&user);
                self.succeed(op, id, Some(profile.clone()));
                Ok(profile)
            }
            Err(e) => Err(self.fail(op, id, e)),
        }
    }

    /// End the session and clear the cached profile.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the profile stays set, so the caller must
    /// surface that the user is still signed in.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let op = AuthOperation::Logout;
        let id = self.begin(op);
        match self.gateway.sign_out().await {
            Ok(()) => {
                self.succeed(op, id, None);
                Ok(())
            }
            Err(e) => Err(self.fail(op, id, e)),
        }
    }

    /// Merge `patch` into the signed-in user and store the service's record.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAuthenticated`] without contacting the gateway
    /// when no profile is cached, or the gateway error.
    pub async fn update_profile(&self, patch: ProfilePatch) -> Result<UserProfile, AuthError> {
        let op = AuthOperation::UpdateProfile;
        let id = self.begin(op);
        let signed_in = self.state.borrow().profile.is_some();
        if !signed_in {
            return Err(self.fail(op, id, AuthError::NotAuthenticated));
        }

        match self.gateway.update_user(&patch.to_metadata()).await {
            Ok(user) => {
                let profile = UserProfile::from_remote(&user);
                self.succeed(op, id, Some(profile.clone()));
                Ok(profile)
            }
            Err(e) => Err(self.fail(op, id, e)),
        }
    }

    /// Re-fetch the current user on every gateway session event.
    ///
    /// The task runs until the gateway's event channel closes; abort the
    /// handle to stop it earlier.
    pub fn spawn_session_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::clone(self);
        let mut events = self.gateway.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => tracing::debug!(?event, "session event; refreshing current user"),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "session events lagged; refreshing current user");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
                // Outcome is recorded on the store.
                let _ = store.fetch_current_user().await;
            }
        })
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    fn begin(&self, op: AuthOperation) -> u64 {
        let id = self.next_request.fetch_add(1, Ordering::Relaxed);
        self.state.send_modify(|state| {
            state.operations[op.index()] = OperationState { phase: RequestPhase::Pending, request_id: id };
        });
        tracing::debug!(operation = op.as_str(), request_id = id, "auth request dispatched");
        id
    }

    /// Settle `op` successfully and write `profile` unless a newer write landed.
    fn succeed(&self, op: AuthOperation, id: u64, profile: Option<UserProfile>) {
        self.state.send_modify(|state| {
            settle_slot(state, op, id, RequestPhase::Succeeded);
            if id > state.profile_request {
                state.profile = profile;
                state.profile_request = id;
            } else {
                tracing::debug!(
                    operation = op.as_str(),
                    request_id = id,
                    newer = state.profile_request,
                    "discarding stale profile response"
                );
            }
        });
    }

    fn fail(&self, op: AuthOperation, id: u64, error: AuthError) -> AuthError {
        tracing::warn!(
            operation = op.as_str(),
            request_id = id,
            code = error.error_code(),
            error = %error,
            "auth request failed"
        );
        let message = error.user_message();
        self.state.send_modify(|state| settle_slot(state, op, id, RequestPhase::Failed(message)));
        error
    }
}

fn settle_slot(state: &mut AuthSnapshot, op: AuthOperation, id: u64, phase: RequestPhase) {
    let slot = &mut state.operations[op.index()];
    if slot.request_id == id {
        slot.phase = phase;
    }
}
