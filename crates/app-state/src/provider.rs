//! AppState provider: the composition root of the client's session state.
//!
//! [`AppStateProvider`] owns the published [`AppState`] for its lifetime. The
//! state combines:
//!
//! - the session error slot (`error` / `set_error`)
//! - the fetching flag, derived from the per-request tracker
//! - the active audio sink (`active_sink_id` / `set_active_sink_id`)
//! - display settings (`settings` / `dispatch_setting`)
//! - the account surface of the auth strategy, when it has one
//! - `get_token`, which wraps the strategy's raw fetch with the bookkeeping
//! - the optional room type hint
//!
//! Every mutation publishes a fresh [`AppSnapshot`] on a watch channel so
//! subscribers always see the latest value.

use crate::auth::{build_strategy, AccountAuth, AuthStrategy, Collaborators, User};
use crate::config::{AuthMode, Config};
use crate::errors::{AppStateError, AuthError};
use crate::observability::metrics;
use crate::request::{RequestId, RequestState, RequestTracker};
use crate::settings::{settings_reducer, Settings, SettingsAction};
use crate::sink::{MediaDevice, SinkSelector};
use common::secret::SecretString;
use common::types::RoomType;
use serde::Deserialize;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn, Instrument};

/// Point-in-time view of the observable session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSnapshot {
    pub error: Option<AuthError>,
    pub is_fetching: bool,
    pub active_sink_id: String,
    pub settings: Settings,
}

/// Successful token endpoint body: `{ data: { attributes: { token } } }`.
#[derive(Deserialize)]
struct RoomTokenEnvelope {
    data: RoomTokenData,
}

#[derive(Deserialize)]
struct RoomTokenData {
    attributes: RoomTokenAttributes,
}

#[derive(Deserialize)]
struct RoomTokenAttributes {
    token: String,
}

/// Pull `data.attributes.token` out of a token endpoint response.
///
/// # Errors
///
/// Returns `AppStateError::MalformedTokenResponse` if the path is missing or
/// not a string.
pub fn extract_room_token(body: serde_json::Value) -> Result<SecretString, AppStateError> {
    serde_json::from_value::<RoomTokenEnvelope>(body)
        .map(|envelope| SecretString::from(envelope.data.attributes.token))
        .map_err(|e| AppStateError::MalformedTokenResponse(e.to_string()))
}

struct Inner {
    strategy: Arc<dyn AuthStrategy>,
    room_type: Option<RoomType>,
    snapshot: watch::Sender<AppSnapshot>,
    requests: Mutex<RequestTracker>,
    sink: Mutex<SinkSelector>,
}

/// The published context value.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("auth_mode", &self.auth_mode())
            .field("room_type", &self.inner.room_type)
            .field("snapshot", &*self.inner.snapshot.borrow())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AppState {
    fn new(strategy: Arc<dyn AuthStrategy>, room_type: Option<RoomType>) -> Self {
        let sink = SinkSelector::new();
        let (snapshot, _) = watch::channel(AppSnapshot {
            error: None,
            is_fetching: false,
            active_sink_id: sink.active_sink_id().to_string(),
            settings: Settings::default(),
        });

        Self {
            inner: Arc::new(Inner {
                strategy,
                room_type,
                snapshot,
                requests: Mutex::new(RequestTracker::new()),
                sink: Mutex::new(sink),
            }),
        }
    }

    /// Current snapshot of the observable state.
    pub fn snapshot(&self) -> AppSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<AppSnapshot> {
        self.inner.snapshot.subscribe()
    }

    // ------------------------------------------------------------------
    // Session error
    // ------------------------------------------------------------------

    pub fn error(&self) -> Option<AuthError> {
        self.inner.snapshot.borrow().error.clone()
    }

    /// Replace the session error. The slot is only cleared this way.
    pub fn set_error(&self, error: Option<AuthError>) {
        self.inner.snapshot.send_modify(|s| s.error = error);
    }

    // ------------------------------------------------------------------
    // Fetching flag
    // ------------------------------------------------------------------

    /// True while any token request is in flight.
    pub fn is_fetching(&self) -> bool {
        self.inner.snapshot.borrow().is_fetching
    }

    pub fn request_state(&self, id: RequestId) -> RequestState {
        lock(&self.inner.requests).state(id)
    }

    /// Id of the most recent `get_token` call.
    pub fn latest_request(&self) -> Option<RequestId> {
        lock(&self.inner.requests).latest()
    }

    pub fn pending_requests(&self) -> usize {
        lock(&self.inner.requests).pending_count()
    }

    // ------------------------------------------------------------------
    // Audio sink
    // ------------------------------------------------------------------

    pub fn active_sink_id(&self) -> String {
        self.inner.snapshot.borrow().active_sink_id.clone()
    }

    pub fn set_active_sink_id(&self, sink_id: impl Into<String>) {
        let mut sink = lock(&self.inner.sink);
        sink.set_active_sink_id(sink_id);
        let active = sink.active_sink_id().to_string();
        debug!(target: "app_state.provider", sink_id = %active, "Active sink selected");
        self.inner.snapshot.send_modify(|s| s.active_sink_id = active);
    }

    /// Feed a fresh device enumeration to the sink selector.
    pub fn update_devices(&self, devices: &[MediaDevice]) {
        let mut sink = lock(&self.inner.sink);
        if sink.on_devices_changed(devices) {
            let active = sink.active_sink_id().to_string();
            info!(target: "app_state.provider", sink_id = %active, "Active sink changed after device update");
            self.inner.snapshot.send_modify(|s| s.active_sink_id = active);
        }
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    pub fn settings(&self) -> Settings {
        self.inner.snapshot.borrow().settings.clone()
    }

    /// Apply one settings action.
    ///
    /// # Errors
    ///
    /// Returns `AppStateError::Settings` if the value is invalid; the
    /// current settings are left untouched.
    pub fn dispatch_setting(&self, action: SettingsAction) -> Result<(), AppStateError> {
        let mut outcome = Ok(());

        self.inner.snapshot.send_if_modified(|s| {
            match settings_reducer(&s.settings, &action) {
                Ok(next) => {
                    let changed = next != s.settings;
                    s.settings = next;
                    changed
                }
                Err(e) => {
                    outcome = Err(e);
                    false
                }
            }
        });

        let status = if outcome.is_ok() { "success" } else { "rejected" };
        metrics::record_settings_dispatch(action.name.as_str(), status);

        outcome.map_err(|e| {
            warn!(target: "app_state.provider", error = %e, "Settings action rejected");
            AppStateError::from(e)
        })
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    pub fn auth_mode(&self) -> AuthMode {
        self.inner.strategy.mode()
    }

    pub fn room_type(&self) -> Option<RoomType> {
        self.inner.room_type
    }

    /// Account surface of the active strategy; `None` without auth.
    pub fn account(&self) -> Option<&dyn AccountAuth> {
        self.inner.strategy.account()
    }

    /// Signed-in user. `None` when signed out or when the strategy has no
    /// accounts.
    pub fn user(&self) -> Option<User> {
        self.account().and_then(|a| a.user())
    }

    /// `None` when the strategy has no accounts.
    pub fn is_auth_ready(&self) -> Option<bool> {
        self.account().map(|a| a.is_auth_ready())
    }

    /// Sign in through the active strategy.
    ///
    /// Failures are recorded in the session error slot and returned.
    ///
    /// # Errors
    ///
    /// - `AppStateError::MissingCollaborator` if the strategy has no accounts
    /// - `AppStateError::Auth` if sign-in fails
    pub async fn sign_in(&self, passcode: Option<SecretString>) -> Result<(), AppStateError> {
        let account = self
            .account()
            .ok_or(AppStateError::MissingCollaborator("account auth"))?;

        account.sign_in(passcode).await.map_err(|e| {
            self.set_error(Some(e.clone()));
            AppStateError::from(e)
        })
    }

    /// Sign out through the active strategy.
    ///
    /// # Errors
    ///
    /// - `AppStateError::MissingCollaborator` if the strategy has no accounts
    /// - `AppStateError::Auth` if sign-out fails
    pub async fn sign_out(&self) -> Result<(), AppStateError> {
        let account = self
            .account()
            .ok_or(AppStateError::MissingCollaborator("account auth"))?;

        account.sign_out().await.map_err(|e| {
            self.set_error(Some(e.clone()));
            AppStateError::from(e)
        })
    }

    /// Run the strategy's session check; a no-op without accounts.
    pub async fn initialize_auth(&self) {
        if let Some(account) = self.account() {
            account.initialize().await;
            info!(
                target: "app_state.provider",
                auth_mode = %self.auth_mode(),
                signed_in = account.user().is_some(),
                "Auth initialized"
            );
        }
    }

    // ------------------------------------------------------------------
    // Token fetch
    // ------------------------------------------------------------------

    /// Fetch a room token for `name` joining `room`.
    ///
    /// The request is marked pending before this returns, so
    /// `is_fetching()` is already true when the caller gets the future.
    /// Dropping the future before it completes abandons the request.
    ///
    /// Failures land in the session error slot and are also returned. A
    /// response without `data.attributes.token` is returned as
    /// `MalformedTokenResponse` and recorded as `AuthError::InvalidResponse`.
    pub fn get_token(
        &self,
        name: &str,
        room: &str,
    ) -> impl Future<Output = Result<SecretString, AppStateError>> + Send + 'static {
        let guard = self.begin_request();
        let strategy = Arc::clone(&self.inner.strategy);
        let name = name.to_string();
        let room = room.to_string();

        let span = tracing::info_span!(
            "app_state.get_token",
            request_id = %guard.id,
            auth_mode = %strategy.mode(),
            room = %room
        );

        async move {
            match strategy.fetch_token(&name, &room).await {
                Ok(body) => {
                    let token = extract_room_token(body);
                    match &token {
                        Ok(_) => guard.resolve(),
                        Err(e) => guard.fail_malformed(e),
                    }
                    token
                }
                Err(e) => {
                    guard.fail(e.clone());
                    Err(AppStateError::Auth(e))
                }
            }
        }
        .instrument(span)
    }

    fn begin_request(&self) -> RequestGuard {
        let mut requests = lock(&self.inner.requests);
        let id = requests.begin();
        self.inner.snapshot.send_modify(|s| s.is_fetching = true);
        debug!(target: "app_state.provider", request_id = %id, "Token request started");

        RequestGuard {
            state: self.clone(),
            id,
            settled: false,
        }
    }

    /// Settle `id`, optionally recording a session error first.
    ///
    /// `status` labels the fetch metric.
    fn settle(
        &self,
        id: RequestId,
        outcome: RequestState,
        status: &'static str,
        error: Option<AuthError>,
    ) {
        let mut requests = lock(&self.inner.requests);
        let elapsed = requests.settle(id, outcome);
        let is_fetching = requests.is_fetching();

        self.inner.snapshot.send_modify(|s| {
            if let Some(error) = error {
                s.error = Some(error);
            }
            s.is_fetching = is_fetching;
        });
        drop(requests);

        if let Some(elapsed) = elapsed {
            metrics::record_token_fetch(self.auth_mode().as_str(), status, elapsed);
        }
    }
}

/// Ties a pending request to the future that drives it.
struct RequestGuard {
    state: AppState,
    id: RequestId,
    settled: bool,
}

impl RequestGuard {
    fn resolve(mut self) {
        self.settled = true;
        self.state.settle(self.id, RequestState::Resolved, "success", None);
        debug!(target: "app_state.provider", request_id = %self.id, "Token request resolved");
    }

    /// The session slot holds the shape fault as `AuthError::InvalidResponse`.
    fn fail_malformed(mut self, error: &AppStateError) {
        self.settled = true;
        metrics::record_token_fetch_failure(self.state.auth_mode().as_str(), "malformed");
        warn!(target: "app_state.provider", request_id = %self.id, error = %error, "Token response has no token");
        let slot = match error {
            AppStateError::MalformedTokenResponse(reason) => reason.clone(),
            other => other.to_string(),
        };
        self.state.settle(
            self.id,
            RequestState::Failed,
            "malformed",
            Some(AuthError::InvalidResponse(slot)),
        );
    }

    fn fail(mut self, error: AuthError) {
        self.settled = true;
        metrics::record_token_fetch_failure(self.state.auth_mode().as_str(), error.error_type());
        warn!(target: "app_state.provider", request_id = %self.id, error = %error, "Token request failed");
        self.state.settle(self.id, RequestState::Failed, "error", Some(error));
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        if !self.settled {
            debug!(target: "app_state.provider", request_id = %self.id, "Token request abandoned");
            self.state.settle(self.id, RequestState::Abandoned, "abandoned", None);
        }
    }
}

/// Owner of the published [`AppState`].
///
/// Built once at startup; the auth strategy it selects is fixed for its
/// lifetime. Use [`AppStateProvider::scope`] to make the state reachable via
/// [`crate::context::use_app_state`].
pub struct AppStateProvider {
    state: AppState,
}

impl AppStateProvider {
    /// Build the provider and its single auth strategy.
    ///
    /// # Errors
    ///
    /// See [`build_strategy`].
    pub fn new(config: &Config, collaborators: &Collaborators) -> Result<Self, AppStateError> {
        let strategy = build_strategy(config, collaborators)?;
        info!(
            target: "app_state.provider",
            auth_mode = %config.auth_mode,
            token_url = %config.token_url(),
            "AppState provider created"
        );
        Ok(Self::with_strategy(strategy, config.room_type))
    }

    /// Build the provider around an already constructed strategy.
    pub fn with_strategy(strategy: Arc<dyn AuthStrategy>, room_type: Option<RoomType>) -> Self {
        Self {
            state: AppState::new(strategy, room_type),
        }
    }

    /// Handle to the published state.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }
}
