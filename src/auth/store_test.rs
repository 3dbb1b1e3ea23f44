use super::*;
use crate::auth::types::{AuthEvent, RemoteUser};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

// =========================================================================
// MockGateway
// =========================================================================

type Reply<T> = oneshot::Receiver<Result<T, AuthError>>;

/// Gateway whose replies are scripted per call. A reply can be ready up
/// front or held back through a `oneshot` to observe the pending phase.
struct MockGateway {
    sign_up: Mutex<VecDeque<Reply<RemoteUser>>>,
    sign_in: Mutex<VecDeque<Reply<RemoteUser>>>,
    sign_out: Mutex<VecDeque<Reply<()>>>,
    get_user: Mutex<VecDeque<Reply<Option<RemoteUser>>>>,
    update_user: Mutex<VecDeque<Reply<RemoteUser>>>,
    calls: Mutex<Vec<&'static str>>,
    metadata: Mutex<Vec<UserMetadata>>,
    events: broadcast::Sender<AuthEvent>,
}

impl MockGateway {
    fn new() -> Self {
        let (events, _) = broadcast::channel(8);
        Self {
            sign_up: Mutex::new(VecDeque::new()),
            sign_in: Mutex::new(VecDeque::new()),
            sign_out: Mutex::new(VecDeque::new()),
            get_user: Mutex::new(VecDeque::new()),
            update_user: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            metadata: Mutex::new(Vec::new()),
            events,
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }
}

fn ready<T>(result: Result<T, AuthError>) -> Reply<T> {
    let (tx, rx) = oneshot::channel();
    let _ = tx.send(result);
    rx
}

fn script<T>(queue: &Mutex<VecDeque<Reply<T>>>, reply: Reply<T>) {
    queue.lock().unwrap().push_back(reply);
}

fn gate<T>(queue: &Mutex<VecDeque<Reply<T>>>) -> oneshot::Sender<Result<T, AuthError>> {
    let (tx, rx) = oneshot::channel();
    script(queue, rx);
    tx
}

async fn answer<T>(queue: &Mutex<VecDeque<Reply<T>>>, name: &str) -> Result<T, AuthError> {
    let reply = queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| panic!("unscripted {name} call"));
    reply.await.expect("reply sender dropped")
}

#[async_trait::async_trait]
impl AuthGateway for MockGateway {
    async fn sign_up(&self, _email: &str, _password: &str, metadata: &UserMetadata) -> Result<RemoteUser, AuthError> {
        self.record("sign_up");
        self.metadata.lock().unwrap().push(metadata.clone());
        answer(&self.sign_up, "sign_up").await
    }

    async fn sign_in_with_password(&self, _email: &str, _password: &str) -> Result<RemoteUser, AuthError> {
        self.record("sign_in");
        answer(&self.sign_in, "sign_in").await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.record("sign_out");
        answer(&self.sign_out, "sign_out").await
    }

    async fn get_user(&self) -> Result<Option<RemoteUser>, AuthError> {
        self.record("get_user");
        answer(&self.get_user, "get_user").await
    }

    async fn update_user(&self, metadata_patch: &UserMetadata) -> Result<RemoteUser, AuthError> {
        self.record("update_user");
        self.metadata.lock().unwrap().push(metadata_patch.clone());
        answer(&self.update_user, "update_user").await
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn user(id: &str, email: &str, name: &str) -> RemoteUser {
    let mut metadata = UserMetadata::new();
    metadata.insert("full_name".into(), name.into());
    RemoteUser { id: id.into(), email: Some(email.into()), phone: None, user_metadata: metadata }
}

fn ada() -> RemoteUser {
    user("u-1", "a@b.com", "Ada")
}

fn invalid_credentials() -> AuthError {
    AuthError::Rejected { status: 400, message: "Invalid login credentials".into() }
}

fn setup() -> (Arc<MockGateway>, Arc<AuthStore>) {
    let gateway = Arc::new(MockGateway::new());
    let store = Arc::new(AuthStore::new(gateway.clone()));
    (gateway, store)
}

fn creds() -> Credentials {
    Credentials::new("a@b.com", "secret1").unwrap()
}

fn assert_invariant(store: &AuthStore) {
    let snapshot = store.snapshot();
    assert_eq!(snapshot.is_authenticated(), snapshot.profile.is_some());
}

async fn signed_in(gateway: &MockGateway, store: &AuthStore) {
    script(&gateway.sign_in, ready(Ok(ada())));
    store.login(&creds()).await.unwrap();
}

async fn wait_for_phase(store: &AuthStore, op: AuthOperation, phase: RequestPhase) {
    let mut rx = store.subscribe();
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| s.operation(op).phase == phase))
        .await
        .expect("timed out waiting for phase")
        .unwrap();
}

// =========================================================================
// Initial state
// =========================================================================

#[test]
fn new_store_is_idle_and_signed_out() {
    let (_, store) = setup();
    assert!(!store.is_authenticated());
    assert!(!store.is_loading());
    assert!(store.latest_error().is_none());
    for op in AuthOperation::ALL {
        assert_eq!(store.operation(op), OperationState::default());
    }
}

// =========================================================================
// login
// =========================================================================

#[tokio::test]
async fn login_success_goes_pending_then_fulfilled() {
    let (gateway, store) = setup();
    let release = gate(&gateway.sign_in);

    let task = tokio::spawn({
        let store = store.clone();
        async move { store.login(&creds()).await }
    });
    wait_for_phase(&store, AuthOperation::Login, RequestPhase::Pending).await;
    assert!(store.is_loading());
    assert!(!store.is_authenticated());

    release.send(Ok(ada())).unwrap();
    let profile = task.await.unwrap().unwrap();

    assert_eq!(profile.email, "a@b.com");
    assert_eq!(store.operation(AuthOperation::Login).phase, RequestPhase::Succeeded);
    assert!(store.is_authenticated());
    assert!(!store.is_loading());
    assert!(store.latest_error().is_none());
    assert_invariant(&store);
}

#[tokio::test]
async fn login_invalid_credentials_records_service_message() {
    let (gateway, store) = setup();
    script(&gateway.sign_in, ready(Err(invalid_credentials())));

    let err = store.login(&creds()).await.unwrap_err();

    assert_eq!(err, invalid_credentials());
    assert!(store.profile().is_none());
    assert_eq!(store.latest_error().as_deref(), Some("Invalid login credentials"));
    assert_eq!(
        store.operation(AuthOperation::Login).phase,
        RequestPhase::Failed("Invalid login credentials".into())
    );
    assert_invariant(&store);
}

#[tokio::test]
async fn login_network_failure_shows_generic_message() {
    let (gateway, store) = setup();
    script(&gateway.sign_in, ready(Err(AuthError::Request("connection reset by peer".into()))));

    store.login(&creds()).await.unwrap_err();

    assert_eq!(store.latest_error().as_deref(), Some(crate::auth::types::GENERIC_ERROR_MESSAGE));
}

#[tokio::test]
async fn failed_login_keeps_existing_profile() {
    let (gateway, store) = setup();
    signed_in(&gateway, &store).await;
    script(&gateway.sign_in, ready(Err(invalid_credentials())));

    store.login(&creds()).await.unwrap_err();

    assert_eq!(store.profile().unwrap().id, "u-1");
}

// =========================================================================
// register
// =========================================================================

#[tokio::test]
async fn register_sends_full_name_and_signs_in() {
    let (gateway, store) = setup();
    script(&gateway.sign_up, ready(Ok(user("u-2", "neo@b.com", "Neo Anderson"))));
    let registration = Registration::new("neo@b.com", "secret1", "Neo Anderson").unwrap();

    let profile = store.register(&registration).await.unwrap();

    assert_eq!(profile.display_name, "Neo Anderson");
    assert!(store.is_authenticated());
    let sent = gateway.metadata.lock().unwrap()[0].clone();
    assert_eq!(sent["full_name"], "Neo Anderson");
}

#[tokio::test]
async fn register_failure_records_error() {
    let (gateway, store) = setup();
    let taken = AuthError::Rejected { status: 422, message: "User already registered".into() };
    script(&gateway.sign_up, ready(Err(taken)));
    let registration = Registration::new("a@b.com", "secret1", "Ada").unwrap();

    store.register(&registration).await.unwrap_err();

    assert!(!store.is_authenticated());
    assert_eq!(store.latest_error().as_deref(), Some("User already registered"));
}

#[tokio::test]
async fn register_pending_confirmation_leaves_profile_unset() {
    let (gateway, store) = setup();
    script(&gateway.sign_up, ready(Err(AuthError::ConfirmationRequired)));
    let registration = Registration::new("neo@b.com", "secret1", "Neo Anderson").unwrap();

    let err = store.register(&registration).await.unwrap_err();

    assert_eq!(err, AuthError::ConfirmationRequired);
    assert!(store.profile().is_none());
    assert!(!store.is_authenticated());
    assert_eq!(
        store.latest_error().as_deref(),
        Some(crate::auth::types::CONFIRMATION_REQUIRED_MESSAGE)
    );
    assert_invariant(&store);
}

// =========================================================================
// logout
// =========================================================================

#[tokio::test]
async fn logout_clears_profile_and_prior_error() {
    let (gateway, store) = setup();
    signed_in(&gateway, &store).await;
    script(&gateway.get_user, ready(Err(AuthError::Request("timeout".into()))));
    store.fetch_current_user().await.unwrap_err();
    assert!(store.latest_error().is_some());

    script(&gateway.sign_out, ready(Ok(())));
    store.logout().await.unwrap();

    assert!(store.profile().is_none());
    assert!(!store.is_authenticated());
    assert!(store.latest_error().is_none());
    assert_invariant(&store);
}

#[tokio::test]
async fn logout_failure_keeps_stale_profile_and_surfaces_error() {
    let (gateway, store) = setup();
    signed_in(&gateway, &store).await;
    script(&gateway.sign_out, ready(Err(AuthError::Rejected { status: 500, message: "Logout failed".into() })));

    let err = store.logout().await.unwrap_err();

    assert!(matches!(err, AuthError::Rejected { status: 500, .. }));
    assert!(store.is_authenticated());
    assert_eq!(store.latest_error().as_deref(), Some("Logout failed"));
}

// =========================================================================
// fetch_current_user
// =========================================================================

#[tokio::test]
async fn fetch_current_user_is_idempotent() {
    let (gateway, store) = setup();
    script(&gateway.get_user, ready(Ok(Some(ada()))));
    script(&gateway.get_user, ready(Ok(Some(ada()))));

    let first = store.fetch_current_user().await.unwrap();
    let after_first = store.profile();
    let second = store.fetch_current_user().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(after_first, store.profile());
    assert_eq!(store.profile().unwrap().display_name, "Ada");
}

#[tokio::test]
async fn fetch_without_session_clears_profile_and_error() {
    let (gateway, store) = setup();
    signed_in(&gateway, &store).await;
    script(&gateway.sign_in, ready(Err(invalid_credentials())));
    store.login(&creds()).await.unwrap_err();

    script(&gateway.get_user, ready(Ok(None)));
    assert!(store.fetch_current_user().await.unwrap().is_none());

    assert!(!store.is_authenticated());
    assert!(store.latest_error().is_none());
}

#[tokio::test]
async fn fetch_failure_leaves_profile_untouched() {
    let (gateway, store) = setup();
    signed_in(&gateway, &store).await;
    script(&gateway.get_user, ready(Err(AuthError::Parse("eof".into()))));

    store.fetch_current_user().await.unwrap_err();

    assert_eq!(store.profile().unwrap().id, "u-1");
    assert_eq!(store.latest_error().as_deref(), Some(crate::auth::types::GENERIC_ERROR_MESSAGE));
}

// =========================================================================
// update_profile
// =========================================================================

#[tokio::test]
async fn update_profile_without_user_rejects_without_calling_gateway() {
    let (gateway, store) = setup();
    let patch = ProfilePatch { display_name: Some("Ada".into()), phone: None };

    let err = store.update_profile(patch).await.unwrap_err();

    assert_eq!(err, AuthError::NotAuthenticated);
    assert!(gateway.calls().is_empty());
    assert_eq!(
        store.operation(AuthOperation::UpdateProfile).phase,
        RequestPhase::Failed("No authenticated user".into())
    );
    assert_eq!(store.latest_error().as_deref(), Some("No authenticated user"));
}

#[tokio::test]
async fn update_profile_stores_server_record() {
    let (gateway, store) = setup();
    signed_in(&gateway, &store).await;
    let mut updated = ada();
    updated.user_metadata.insert("phone".into(), "555-0100".into());
    updated.user_metadata.insert("full_name".into(), "Ada King".into());
    script(&gateway.update_user, ready(Ok(updated)));

    let patch = ProfilePatch { display_name: Some("Ada King".into()), phone: Some("555-0100".into()) };
    let profile = store.update_profile(patch).await.unwrap();

    assert_eq!(profile.display_name, "Ada King");
    assert_eq!(profile.phone.as_deref(), Some("555-0100"));
    assert_eq!(store.profile(), Some(profile));
    let sent = gateway.metadata.lock().unwrap()[0].clone();
    assert_eq!(sent.len(), 2);
}

#[tokio::test]
async fn update_profile_trusts_server_for_omitted_fields() {
    let (gateway, store) = setup();
    let mut with_phone = ada();
    with_phone.user_metadata.insert("phone".into(), "555-0100".into());
    script(&gateway.sign_in, ready(Ok(with_phone)));
    store.login(&creds()).await.unwrap();

    // Server record comes back without the phone.
    script(&gateway.update_user, ready(Ok(user("u-1", "a@b.com", "Ada B"))));
    let patch = ProfilePatch { display_name: Some("Ada B".into()), phone: None };
    store.update_profile(patch).await.unwrap();

    assert!(store.profile().unwrap().phone.is_none());
}

#[tokio::test]
async fn update_profile_failure_leaves_profile() {
    let (gateway, store) = setup();
    signed_in(&gateway, &store).await;
    script(&gateway.update_user, ready(Err(AuthError::Rejected { status: 401, message: "JWT expired".into() })));

    store
        .update_profile(ProfilePatch { display_name: Some("X Y".into()), phone: None })
        .await
        .unwrap_err();

    assert_eq!(store.profile().unwrap().display_name, "Ada");
    assert_eq!(store.latest_error().as_deref(), Some("JWT expired"));
}

// =========================================================================
// Lifecycle independence and ordering
// =========================================================================

#[tokio::test]
async fn later_success_hides_earlier_error_but_keeps_its_phase() {
    let (gateway, store) = setup();
    script(&gateway.sign_in, ready(Err(invalid_credentials())));
    store.login(&creds()).await.unwrap_err();

    script(&gateway.get_user, ready(Ok(None)));
    store.fetch_current_user().await.unwrap();

    assert!(store.latest_error().is_none());
    assert!(matches!(store.operation(AuthOperation::Login).phase, RequestPhase::Failed(_)));
    assert_eq!(store.operation(AuthOperation::FetchCurrentUser).phase, RequestPhase::Succeeded);
}

#[tokio::test]
async fn stale_login_response_does_not_override_later_logout() {
    let (gateway, store) = setup();
    let release_login = gate(&gateway.sign_in);

    let login = tokio::spawn({
        let store = store.clone();
        async move { store.login(&creds()).await }
    });
    wait_for_phase(&store, AuthOperation::Login, RequestPhase::Pending).await;

    script(&gateway.sign_out, ready(Ok(())));
    store.logout().await.unwrap();
    assert!(store.is_loading());

    release_login.send(Ok(ada())).unwrap();
    login.await.unwrap().unwrap();

    assert!(store.profile().is_none(), "older login must not resurrect the profile");
    assert_eq!(store.operation(AuthOperation::Login).phase, RequestPhase::Succeeded);
    assert!(!store.is_loading());
    assert_invariant(&store);
}

#[tokio::test]
async fn next_fetch_reconciles_cache_after_stale_login() {
    let (gateway, store) = setup();
    let release_login = gate(&gateway.sign_in);
    let login = tokio::spawn({
        let store = store.clone();
        async move { store.login(&creds()).await }
    });
    wait_for_phase(&store, AuthOperation::Login, RequestPhase::Pending).await;
    script(&gateway.sign_out, ready(Ok(())));
    store.logout().await.unwrap();
    release_login.send(Ok(ada())).unwrap();
    login.await.unwrap().unwrap();
    assert!(!store.is_authenticated());

    // The gateway still holds the late login's session.
    script(&gateway.get_user, ready(Ok(Some(ada()))));
    store.fetch_current_user().await.unwrap();

    assert_eq!(store.profile().unwrap().id, "u-1");
    assert_invariant(&store);
}

#[tokio::test]
async fn superseded_fetch_does_not_overwrite_newer_fetch() {
    let (gateway, store) = setup();
    let release_first = gate(&gateway.get_user);

    let first = tokio::spawn({
        let store = store.clone();
        async move { store.fetch_current_user().await }
    });
    wait_for_phase(&store, AuthOperation::FetchCurrentUser, RequestPhase::Pending).await;
    let first_id = store.operation(AuthOperation::FetchCurrentUser).request_id;

    script(&gateway.get_user, ready(Ok(Some(user("u-2", "b@b.com", "Bea")))));
    store.fetch_current_user().await.unwrap();
    let second_id = store.operation(AuthOperation::FetchCurrentUser).request_id;
    assert!(second_id > first_id);

    release_first.send(Err(AuthError::Request("late timeout".into()))).unwrap();
    first.await.unwrap().unwrap_err();

    let state = store.operation(AuthOperation::FetchCurrentUser);
    assert_eq!(state.request_id, second_id);
    assert_eq!(state.phase, RequestPhase::Succeeded);
    assert_eq!(store.profile().unwrap().id, "u-2");
    assert!(store.latest_error().is_none());
}

// =========================================================================
// Errors, subscriptions, session events
// =========================================================================

#[tokio::test]
async fn dismiss_error_clears_banner() {
    let (gateway, store) = setup();
    script(&gateway.sign_in, ready(Err(invalid_credentials())));
    store.login(&creds()).await.unwrap_err();

    store.dismiss_error();

    assert!(store.latest_error().is_none());
    assert_eq!(store.operation(AuthOperation::Login).phase, RequestPhase::Idle);
}

#[tokio::test]
async fn subscribers_see_transitions() {
    let (gateway, store) = setup();
    let mut rx = store.subscribe();
    signed_in(&gateway, &store).await;

    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_authenticated());
}

#[tokio::test]
async fn session_listener_refetches_on_event() {
    let (gateway, store) = setup();
    let listener = store.spawn_session_listener();
    script(&gateway.get_user, ready(Ok(Some(ada()))));

    gateway.events.send(AuthEvent::TokenRefreshed).unwrap();

    let mut rx = store.subscribe();
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(AuthSnapshot::is_authenticated))
        .await
        .expect("listener did not refresh")
        .unwrap();
    assert_eq!(gateway.calls(), vec!["get_user"]);
    listener.abort();
}
