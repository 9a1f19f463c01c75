//! Authentication strategies.
//!
//! Exactly one strategy is built per provider, from [`Config::auth_mode`]:
//!
//! - [`NoAuthStrategy`] (`none`): demo endpoint with a static bearer.
//! - [`FirebaseAuthStrategy`] (`firebase`): identity-provider sign-in.
//! - [`PasscodeAuthStrategy`] (`passcode`): shared meeting passcode.
//!
//! Every strategy fetches raw token JSON. Strategies with a user account
//! also expose an [`AccountAuth`] surface; the no-auth strategy has none, so
//! `user`, `sign_in`, `sign_out` and `is_auth_ready` are absent for it.

pub mod firebase;
pub mod none;
pub mod passcode;

pub use firebase::{FirebaseAuthStrategy, IdentityProvider};
pub use none::NoAuthStrategy;
pub use passcode::PasscodeAuthStrategy;

use crate::config::{AuthMode, Config};
use crate::errors::{AppStateError, AuthError};
use common::secret::SecretString;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

/// Connection timeout for the token endpoint.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Signed-in user as seen by the UI.
///
/// Identity-provider users carry profile fields; passcode users only carry
/// the passcode.
#[derive(Debug, Clone, Default)]
pub struct User {
    pub uid: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub email: Option<String>,
    pub passcode: Option<SecretString>,
}

impl User {
    pub fn with_passcode(passcode: SecretString) -> Self {
        Self {
            passcode: Some(passcode),
            ..Self::default()
        }
    }
}

/// A token-fetch strategy.
#[async_trait::async_trait]
pub trait AuthStrategy: Send + Sync {
    fn mode(&self) -> AuthMode;

    /// Fetch the raw token response for `identity` joining `room_name`.
    async fn fetch_token(
        &self,
        identity: &str,
        room_name: &str,
    ) -> Result<serde_json::Value, AuthError>;

    /// Account surface, if this strategy has signed-in users.
    fn account(&self) -> Option<&dyn AccountAuth> {
        None
    }
}

/// Sign-in surface of strategies with user accounts.
#[async_trait::async_trait]
pub trait AccountAuth: Send + Sync {
    fn user(&self) -> Option<User>;

    /// False until the strategy has checked for an existing session.
    fn is_auth_ready(&self) -> bool;

    /// Check for an existing session and mark the strategy ready.
    async fn initialize(&self);

    /// `passcode` is required by passcode auth and ignored otherwise.
    async fn sign_in(&self, passcode: Option<SecretString>) -> Result<(), AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// External collaborators the strategies may need.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub identity_provider: Option<Arc<dyn IdentityProvider>>,
}

impl Collaborators {
    pub fn with_identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity_provider = Some(provider);
        self
    }
}

/// Build the single strategy selected by `config.auth_mode`.
///
/// # Errors
///
/// - `AppStateError::MissingCollaborator` if firebase mode has no identity
///   provider
/// - `AppStateError::Configuration` if the no-auth bearer is missing or the
///   HTTP client cannot be built
pub fn build_strategy(
    config: &Config,
    collaborators: &Collaborators,
) -> Result<Arc<dyn AuthStrategy>, AppStateError> {
    let client = build_http_client(config.http_timeout)?;
    let token_url = config.token_url();

    let strategy: Arc<dyn AuthStrategy> = match config.auth_mode {
        AuthMode::NoAuth => {
            let bearer = config.token_bearer.clone().ok_or_else(|| {
                AppStateError::Configuration("TOKEN_BEARER is required without auth".to_string())
            })?;
            Arc::new(NoAuthStrategy::new(client, token_url, bearer))
        }
        AuthMode::Firebase => {
            let provider = collaborators
                .identity_provider
                .clone()
                .ok_or(AppStateError::MissingCollaborator("identity provider"))?;
            Arc::new(FirebaseAuthStrategy::new(client, token_url, provider))
        }
        AuthMode::Passcode => Arc::new(PasscodeAuthStrategy::new(
            client,
            token_url,
            config.initial_passcode.clone(),
        )),
    };

    Ok(strategy)
}

fn build_http_client(timeout: Duration) -> Result<Client, AppStateError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(client_build_error)
}

fn client_build_error(err: impl std::fmt::Display) -> AppStateError {
    error!(target: "app_state.auth", error = %err, "Failed to build HTTP client");
    AppStateError::Configuration(format!("HTTP client: {err}"))
}

/// Error body shape returned by the token endpoint.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Best-effort extraction of `error.message` from a failed response body.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|d| d.message)
}

/// Parse a successful response body as JSON.
async fn parse_json(response: reqwest::Response) -> Result<serde_json::Value, AuthError> {
    response
        .json::<serde_json::Value>()
        .await
        .map_err(|e| AuthError::InvalidResponse(e.to_string()))
}

/// Read a failed response and return its status with a display message.
///
/// The message is the body's `error.message` when present, otherwise the
/// status reason phrase.
async fn failure(response: reqwest::Response) -> (u16, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string()
    });

    (status.as_u16(), message)
}

/// Map a non-success response to `AuthError::Rejected`.
async fn rejected(response: reqwest::Response) -> AuthError {
    let (status, message) = failure(response).await;
    AuthError::Rejected { status, message }
}
