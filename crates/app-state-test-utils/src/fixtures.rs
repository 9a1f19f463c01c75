//! Fixed test data.

use app_state::auth::User;
use std::collections::HashMap;

/// Bearer credential the harness expects in no-auth mode.
pub const TEST_BEARER: &str = "test-bearer";

/// Passcode the harness accepts in passcode mode.
pub const TEST_PASSCODE: &str = "123456";

/// ID token issued by [`crate::MockIdentityProvider`] for [`test_user`].
pub const TEST_ID_TOKEN: &str = "id-token-uid-alice";

/// Successful token endpoint body carrying `token`.
pub fn token_body(token: &str) -> serde_json::Value {
    serde_json::json!({ "data": { "attributes": { "token": token } } })
}

/// Failed token endpoint body carrying `message`.
pub fn error_body(message: &str) -> serde_json::Value {
    serde_json::json!({ "error": { "message": message } })
}

/// Identity-provider user used across tests.
pub fn test_user() -> User {
    User {
        uid: Some("uid-alice".to_string()),
        display_name: Some("Alice".to_string()),
        photo_url: Some("https://example.com/alice.png".to_string()),
        email: Some("alice@example.com".to_string()),
        passcode: None,
    }
}

/// Build a config variable map from `(key, value)` pairs.
pub fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}
