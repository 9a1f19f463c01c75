//! # AppState Test Utilities
//!
//! Shared test utilities for the client application state.
//!
//! This crate provides:
//! - Token endpoint harness (`TestTokenServer`, wiremock backed)
//! - Mock identity provider (`MockIdentityProvider`)
//! - Controllable auth strategy (`ControlledStrategy` for pending and
//!   overlapping request tests)
//! - Fixtures (token bodies, config vars, test credentials)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use app_state_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let server = TestTokenServer::start().await;
//!     server.mount_no_auth_token("tok-123").await;
//!
//!     let config = Config::from_vars(&server.vars(None)).unwrap();
//!     let provider = AppStateProvider::new(&config, &Collaborators::default()).unwrap();
//!
//!     let token = provider.state().get_token("alice", "room1").await.unwrap();
//!     assert_eq!(token.expose_secret(), "tok-123");
//! }
//! ```

pub mod fixtures;
pub mod mock_identity;
pub mod mock_strategy;
pub mod mock_token_server;

// Re-export commonly used items
pub use fixtures::*;
pub use mock_identity::*;
pub use mock_strategy::*;
pub use mock_token_server::*;
