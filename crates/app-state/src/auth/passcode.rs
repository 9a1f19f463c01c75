//! Passcode strategy.
//!
//! Every participant of a deployment shares one passcode. Token requests
//! are `POST {token_url}` with a JSON body carrying the identity, room name
//! and passcode. Signing in verifies the passcode with a throwaway request
//! that does not create a room.

use super::{failure, parse_json, AccountAuth, AuthStrategy, User};
use crate::config::AuthMode;
use crate::errors::AuthError;
use common::secret::{ExposeSecret, SecretString};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info, instrument, warn};

/// Identity used when only verifying a passcode.
const VERIFY_IDENTITY: &str = "temp-name";

/// Room name used when only verifying a passcode.
const VERIFY_ROOM: &str = "temp-room";

#[derive(Serialize)]
struct PasscodeTokenRequest<'a> {
    user_identity: &'a str,
    room_name: &'a str,
    passcode: &'a str,
    create_room: bool,
}

/// Outcome of a passcode check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasscodeVerification {
    Valid,
    Invalid(AuthError),
}

/// Map the endpoint's error message to a session error.
pub fn passcode_error(status: u16, message: &str) -> AuthError {
    match message {
        "passcode incorrect" => AuthError::PasscodeIncorrect,
        "passcode expired" => AuthError::PasscodeExpired,
        other => AuthError::Rejected {
            status,
            message: other.to_string(),
        },
    }
}

pub struct PasscodeAuthStrategy {
    client: Client,
    token_url: String,
    initial_passcode: Option<SecretString>,
    user: RwLock<Option<User>>,
    auth_ready: AtomicBool,
}

impl PasscodeAuthStrategy {
    pub fn new(client: Client, token_url: String, initial_passcode: Option<SecretString>) -> Self {
        Self {
            client,
            token_url,
            initial_passcode,
            user: RwLock::new(None),
            auth_ready: AtomicBool::new(false),
        }
    }

    fn set_user(&self, user: Option<User>) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = user;
    }

    async fn post_token_request(
        &self,
        identity: &str,
        room_name: &str,
        passcode: &SecretString,
        create_room: bool,
    ) -> Result<reqwest::Response, AuthError> {
        let body = PasscodeTokenRequest {
            user_identity: identity,
            room_name,
            passcode: passcode.expose_secret(),
            create_room,
        };

        self.client
            .post(&self.token_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "app_state.auth.passcode", error = %e, "Token request failed");
                AuthError::Transport(e.to_string())
            })
    }

    /// Check `passcode` against the token endpoint without creating a room.
    ///
    /// # Errors
    ///
    /// Transport failures and unexpected statuses are errors; a rejected
    /// passcode is reported as [`PasscodeVerification::Invalid`].
    #[instrument(skip_all)]
    pub async fn verify_passcode(
        &self,
        passcode: &SecretString,
    ) -> Result<PasscodeVerification, AuthError> {
        let response = self
            .post_token_request(VERIFY_IDENTITY, VERIFY_ROOM, passcode, false)
            .await?;
        if response.status().is_success() {
            return Ok(PasscodeVerification::Valid);
        }

        let (status, message) = failure(response).await;

        if status == StatusCode::UNAUTHORIZED.as_u16() {
            debug!(target: "app_state.auth.passcode", "Passcode rejected");
            Ok(PasscodeVerification::Invalid(passcode_error(status, &message)))
        } else {
            warn!(target: "app_state.auth.passcode", status, "Unexpected verification response");
            Err(AuthError::Rejected { status, message })
        }
    }

    async fn sign_in_with(&self, passcode: SecretString) -> Result<(), AuthError> {
        match self.verify_passcode(&passcode).await? {
            PasscodeVerification::Valid => {
                info!(target: "app_state.auth.passcode", "Passcode accepted");
                self.set_user(Some(User::with_passcode(passcode)));
                Ok(())
            }
            PasscodeVerification::Invalid(err) => Err(err),
        }
    }
}

#[async_trait::async_trait]
impl AuthStrategy for PasscodeAuthStrategy {
    fn mode(&self) -> AuthMode {
        AuthMode::Passcode
    }

    #[instrument(skip_all, fields(token_url = %self.token_url, room_name = %room_name))]
    async fn fetch_token(
        &self,
        identity: &str,
        room_name: &str,
    ) -> Result<serde_json::Value, AuthError> {
        let passcode = self
            .user()
            .and_then(|u| u.passcode)
            .ok_or(AuthError::NotSignedIn)?;

        let response = self
            .post_token_request(identity, room_name, &passcode, true)
            .await?;
        if !response.status().is_success() {
            let (status, message) = failure(response).await;
            let err = passcode_error(status, &message);
            warn!(target: "app_state.auth.passcode", error = %err, "Token endpoint rejected request");
            return Err(err);
        }

        parse_json(response).await
    }

    fn account(&self) -> Option<&dyn AccountAuth> {
        Some(self)
    }
}

#[async_trait::async_trait]
impl AccountAuth for PasscodeAuthStrategy {
    fn user(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn is_auth_ready(&self) -> bool {
        self.auth_ready.load(Ordering::SeqCst)
    }

    async fn initialize(&self) {
        if let Some(passcode) = self.initial_passcode.clone() {
            if let Err(e) = self.sign_in_with(passcode).await {
                warn!(target: "app_state.auth.passcode", error = %e, "Initial passcode not accepted");
            }
        }
        self.auth_ready.store(true, Ordering::SeqCst);
    }

    async fn sign_in(&self, passcode: Option<SecretString>) -> Result<(), AuthError> {
        let passcode = passcode.ok_or(AuthError::MissingPasscode)?;
        self.sign_in_with(passcode).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.set_user(None);
        info!(target: "app_state.auth.passcode", "Passcode cleared");
        Ok(())
    }
}
