//! Application-state error types.
//!
//! Three kinds of failure leave this crate:
//!
//! - [`AuthError`]: the active strategy or the token endpoint failed. These
//!   are recorded in the session error slot for the UI and also returned to
//!   the caller.
//! - [`AppStateError::MalformedTokenResponse`]: the endpoint answered but the
//!   body has no `data.attributes.token`. Returned to the caller; the
//!   session slot records it as [`AuthError::InvalidResponse`].
//! - [`AppStateError::OutsideProvider`]: the context accessor was used
//!   without an enclosing provider scope.

use crate::config::ConfigError;
use crate::settings::SettingsError;
use thiserror::Error;

/// Session/auth errors.
///
/// `Clone` so the same value can sit in the session error slot and be
/// returned to the caller of `get_token`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Token request failed: {0}")]
    Transport(String),

    #[error("Token request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    #[error("Passcode is incorrect")]
    PasscodeIncorrect,

    #[error("Passcode has expired")]
    PasscodeExpired,

    #[error("A passcode is required to sign in")]
    MissingPasscode,

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Identity provider error: {0}")]
    Provider(String),
}

impl AuthError {
    /// Bounded label for metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            AuthError::Transport(_) => "transport",
            AuthError::Rejected { .. } => "rejected",
            AuthError::InvalidResponse(_) => "invalid_response",
            AuthError::PasscodeIncorrect => "passcode_incorrect",
            AuthError::PasscodeExpired => "passcode_expired",
            AuthError::MissingPasscode => "missing_passcode",
            AuthError::NotSignedIn => "not_signed_in",
            AuthError::Provider(_) => "provider",
        }
    }
}

/// Errors returned by the provider, its handle and the context accessor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppStateError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Malformed token response: {0}")]
    MalformedTokenResponse(String),

    #[error("use_app_state must be used within the AppStateProvider")]
    OutsideProvider,

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<ConfigError> for AppStateError {
    fn from(err: ConfigError) -> Self {
        AppStateError::Configuration(err.to_string())
    }
}
