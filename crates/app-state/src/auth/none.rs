//! No-auth strategy backed by the demo token endpoint.
//!
//! Sends `POST {token_url}` with a fixed bearer credential and an
//! `application/json` content type and no body. The identity and room name
//! are not forwarded; the endpoint decides what token to hand out.

use super::{parse_json, rejected, AuthStrategy};
use crate::config::AuthMode;
use crate::errors::AuthError;
use common::secret::{ExposeSecret, SecretString};
use reqwest::Client;
use tracing::{instrument, warn};

pub struct NoAuthStrategy {
    client: Client,
    token_url: String,
    bearer: SecretString,
}

impl NoAuthStrategy {
    pub fn new(client: Client, token_url: String, bearer: SecretString) -> Self {
        Self {
            client,
            token_url,
            bearer,
        }
    }
}

#[async_trait::async_trait]
impl AuthStrategy for NoAuthStrategy {
    fn mode(&self) -> AuthMode {
        AuthMode::NoAuth
    }

    #[instrument(skip_all, fields(token_url = %self.token_url))]
    async fn fetch_token(
        &self,
        _identity: &str,
        _room_name: &str,
    ) -> Result<serde_json::Value, AuthError> {
        let response = self
            .client
            .post(&self.token_url)
            .header(
                "Authorization",
                format!("Bearer {}", self.bearer.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(target: "app_state.auth.none", error = %e, "Token request failed");
                AuthError::Transport(e.to_string())
            })?;

        if !response.status().is_success() {
            let err = rejected(response).await;
            warn!(target: "app_state.auth.none", error = %err, "Token endpoint rejected request");
            return Err(err);
        }

        parse_json(response).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn strategy(server: &MockServer, endpoint: &str) -> NoAuthStrategy {
        NoAuthStrategy::new(
            Client::new(),
            format!("{}{}", server.uri(), endpoint),
            SecretString::from("demo-bearer"),
        )
    }

    #[tokio::test]
    async fn test_fetch_token_posts_with_bearer_and_no_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("Authorization", "Bearer demo-bearer"))
            .and(header("Content-Type", "application/json"))
            .and(body_string(""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "attributes": { "token": "tok-123" } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let body = strategy(&server, "/token")
            .fetch_token("alice", "room1")
            .await
            .unwrap();

        assert_eq!(
            body.pointer("/data/attributes/token"),
            Some(&serde_json::json!("tok-123"))
        );
    }

    #[tokio::test]
    async fn test_fetch_token_maps_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": { "message": "token service down" }
            })))
            .mount(&server)
            .await;

        let err = strategy(&server, "/token")
            .fetch_token("alice", "room1")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AuthError::Rejected {
                status: 500,
                message: "token service down".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_token_rejects_non_json_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = strategy(&server, "/token")
            .fetch_token("alice", "room1")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_fetch_token_unreachable_endpoint() {
        let strategy = NoAuthStrategy::new(
            Client::new(),
            "http://127.0.0.1:1/token".to_string(),
            SecretString::from("demo-bearer"),
        );

        let err = strategy.fetch_token("alice", "room1").await.unwrap_err();
        assert!(matches!(err, AuthError::Transport(_)));
    }
}
