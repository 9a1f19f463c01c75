//! Token endpoint harness.
//!
//! Wraps a wiremock `MockServer` with mounts for the request shape of each
//! auth mode.
//!
//! # Example
//!
//! ```rust,ignore
//! let server = TestTokenServer::start().await;
//! server.mount_passcode_verification(TEST_PASSCODE).await;
//! server.mount_passcode_token(TEST_PASSCODE, "alice", "room1", "tok").await;
//!
//! let config = Config::from_vars(&server.vars(Some("passcode"))).unwrap();
//! ```

use crate::fixtures::{error_body, token_body, TEST_BEARER};
use std::collections::HashMap;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the harness serves tokens on unless told otherwise.
pub const TEST_TOKEN_PATH: &str = "/token";

pub struct TestTokenServer {
    server: MockServer,
    token_path: String,
}

impl TestTokenServer {
    /// Start a server serving on [`TEST_TOKEN_PATH`].
    pub async fn start() -> Self {
        Self::start_at(TEST_TOKEN_PATH).await
    }

    /// Start a server serving on `token_path`.
    pub async fn start_at(token_path: &str) -> Self {
        Self {
            server: MockServer::start().await,
            token_path: token_path.to_string(),
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Config variables pointing at this server.
    ///
    /// `auth_mode` is left unset when `None`.
    pub fn vars(&self, auth_mode: Option<&str>) -> HashMap<String, String> {
        let mut vars = HashMap::from([
            ("APP_BASE_URL".to_string(), self.uri()),
            ("TOKEN_ENDPOINT".to_string(), self.token_path.clone()),
            ("TOKEN_BEARER".to_string(), TEST_BEARER.to_string()),
            ("TOKEN_HTTP_TIMEOUT_SECONDS".to_string(), "2".to_string()),
        ]);
        if let Some(mode) = auth_mode {
            vars.insert("AUTH_MODE".to_string(), mode.to_string());
        }
        vars
    }

    /// No-auth: answer bearer-authenticated POSTs with `token`.
    pub async fn mount_no_auth_token(&self, token: &str) {
        Mock::given(method("POST"))
            .and(path(self.token_path.as_str()))
            .and(header("Authorization", format!("Bearer {TEST_BEARER}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body(token)))
            .mount(&self.server)
            .await;
    }

    /// Answer any request on the token path with `status` and an error body.
    pub async fn mount_failure(&self, status: u16, message: &str) {
        Mock::given(path(self.token_path.as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_json(error_body(message)))
            .mount(&self.server)
            .await;
    }

    /// Answer any request on the token path with `body` and status 200.
    pub async fn mount_raw(&self, body: serde_json::Value) {
        Mock::given(path(self.token_path.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Firebase: answer GETs carrying `id_token` for `identity` in `room`.
    pub async fn mount_firebase_token(&self, id_token: &str, identity: &str, room: &str, token: &str) {
        Mock::given(method("GET"))
            .and(path(self.token_path.as_str()))
            .and(header("Authorization", id_token))
            .and(query_param("identity", identity))
            .and(query_param("roomName", room))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body(token)))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Passcode: accept verification requests for `passcode`.
    pub async fn mount_passcode_verification(&self, passcode: &str) {
        Mock::given(method("POST"))
            .and(path(self.token_path.as_str()))
            .and(body_json(serde_json::json!({
                "user_identity": "temp-name",
                "room_name": "temp-room",
                "passcode": passcode,
                "create_room": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&self.server)
            .await;
    }

    /// Passcode: answer room token requests for `identity` in `room`.
    pub async fn mount_passcode_token(&self, passcode: &str, identity: &str, room: &str, token: &str) {
        Mock::given(method("POST"))
            .and(path(self.token_path.as_str()))
            .and(body_json(serde_json::json!({
                "user_identity": identity,
                "room_name": room,
                "passcode": passcode,
                "create_room": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body(token)))
            .expect(1)
            .mount(&self.server)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_vars_point_at_server() {
        let server = TestTokenServer::start_at("/custom").await;
        let vars = server.vars(Some("passcode"));

        assert_eq!(vars.get("APP_BASE_URL"), Some(&server.uri()));
        assert_eq!(vars.get("TOKEN_ENDPOINT").map(String::as_str), Some("/custom"));
        assert_eq!(vars.get("AUTH_MODE").map(String::as_str), Some("passcode"));
        assert!(!server.vars(None).contains_key("AUTH_MODE"));
    }
}
