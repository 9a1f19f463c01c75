//! AppState Service Library
//!
//! Application-wide session state for the Dark Tower web client. One
//! [`AppStateProvider`] is built at startup and publishes an [`AppState`]
//! that holds:
//!
//! - the session error slot and the token fetching flag
//! - the active audio output sink
//! - display settings, updated through a reducer
//! - the account surface of the configured auth strategy
//! - `get_token`, which fetches room tokens through that strategy
//!
//! # Modules
//!
//! - `auth` - Auth strategies (none, firebase, passcode)
//! - `config` - Configuration from environment
//! - `context` - Scoped access via [`use_app_state`]
//! - `errors` - Session and provider error types
//! - `observability` - Metrics
//! - `provider` - The provider and its published state
//! - `request` - Per-request state tracking
//! - `settings` - Settings model and reducer
//! - `sink` - Audio sink selection

pub mod auth;
pub mod config;
pub mod context;
pub mod errors;
pub mod observability;
pub mod provider;
pub mod request;
pub mod settings;
pub mod sink;

pub use config::{AuthMode, Config, ConfigError};
pub use context::use_app_state;
pub use errors::{AppStateError, AuthError};
pub use provider::{AppSnapshot, AppState, AppStateProvider};
