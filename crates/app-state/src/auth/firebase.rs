//! Identity-provider (Firebase style) strategy.
//!
//! Sign-in is delegated to an [`IdentityProvider`], the client SDK of the
//! identity service. Token requests are `GET {token_url}?identity=..&roomName=..`
//! carrying the signed-in user's ID token as the raw `Authorization` value.

use super::{parse_json, rejected, AccountAuth, AuthStrategy, User};
use crate::config::AuthMode;
use crate::errors::AuthError;
use common::secret::{ExposeSecret, SecretString};
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, instrument, warn};

/// Client SDK of the identity service.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// User of a session restored by the SDK, if any.
    async fn current_user(&self) -> Result<Option<User>, AuthError>;

    /// Run the interactive sign-in flow.
    async fn sign_in(&self) -> Result<User, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Fresh ID token for `user`.
    async fn id_token(&self, user: &User) -> Result<SecretString, AuthError>;
}

pub struct FirebaseAuthStrategy {
    client: Client,
    token_url: String,
    provider: Arc<dyn IdentityProvider>,
    user: RwLock<Option<User>>,
    auth_ready: AtomicBool,
}

impl FirebaseAuthStrategy {
    pub fn new(client: Client, token_url: String, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            client,
            token_url,
            provider,
            user: RwLock::new(None),
            auth_ready: AtomicBool::new(false),
        }
    }

    fn set_user(&self, user: Option<User>) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = user;
    }
}

#[async_trait::async_trait]
impl AuthStrategy for FirebaseAuthStrategy {
    fn mode(&self) -> AuthMode {
        AuthMode::Firebase
    }

    #[instrument(skip_all, fields(token_url = %self.token_url, room_name = %room_name))]
    async fn fetch_token(
        &self,
        identity: &str,
        room_name: &str,
    ) -> Result<serde_json::Value, AuthError> {
        let user = self.user().ok_or(AuthError::NotSignedIn)?;
        let id_token = self.provider.id_token(&user).await?;

        let response = self
            .client
            .get(&self.token_url)
            .query(&[("identity", identity), ("roomName", room_name)])
            .header("Authorization", id_token.expose_secret())
            .send()
            .await
            .map_err(|e| {
                warn!(target: "app_state.auth.firebase", error = %e, "Token request failed");
                AuthError::Transport(e.to_string())
            })?;

        if !response.status().is_success() {
            let err = rejected(response).await;
            warn!(target: "app_state.auth.firebase", error = %err, "Token endpoint rejected request");
            return Err(err);
        }

        parse_json(response).await
    }

    fn account(&self) -> Option<&dyn AccountAuth> {
        Some(self)
    }
}

#[async_trait::async_trait]
impl AccountAuth for FirebaseAuthStrategy {
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
        match self.provider.current_user().await {
            Ok(user) => {
                debug!(
                    target: "app_state.auth.firebase",
                    restored = user.is_some(),
                    "Identity provider session checked"
                );
                self.set_user(user);
            }
            Err(e) => {
                warn!(target: "app_state.auth.firebase", error = %e, "Failed to restore session");
            }
        }
        self.auth_ready.store(true, Ordering::SeqCst);
    }

    async fn sign_in(&self, _passcode: Option<SecretString>) -> Result<(), AuthError> {
        let user = self.provider.sign_in().await?;
        info!(target: "app_state.auth.firebase", "User signed in");
        self.set_user(Some(user));
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.provider.sign_out().await?;
        info!(target: "app_state.auth.firebase", "User signed out");
        self.set_user(None);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Minimal in-file identity provider; the test-utils crate has a fuller one.
    struct StubProvider {
        restored: Option<User>,
        sign_outs: AtomicUsize,
    }

    fn alice() -> User {
        User {
            uid: Some("uid-alice".to_string()),
            display_name: Some("Alice".to_string()),
            ..User::default()
        }
    }

    #[async_trait::async_trait]
    impl IdentityProvider for StubProvider {
        async fn current_user(&self) -> Result<Option<User>, AuthError> {
            Ok(self.restored.clone())
        }

        async fn sign_in(&self) -> Result<User, AuthError> {
            Ok(alice())
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            self.sign_outs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn id_token(&self, user: &User) -> Result<SecretString, AuthError> {
            Ok(SecretString::from(format!(
                "id-token-{}",
                user.uid.as_deref().unwrap_or("anon")
            )))
        }
    }

    fn strategy(token_url: String, restored: Option<User>) -> FirebaseAuthStrategy {
        FirebaseAuthStrategy::new(
            Client::new(),
            token_url,
            Arc::new(StubProvider {
                restored,
                sign_outs: AtomicUsize::new(0),
            }),
        )
    }

    #[tokio::test]
    async fn test_initialize_restores_session_and_marks_ready() {
        let strategy = strategy("http://unused/token".to_string(), Some(alice()));
        assert!(!strategy.is_auth_ready());

        strategy.initialize().await;

        assert!(strategy.is_auth_ready());
        assert_eq!(
            strategy.user().and_then(|u| u.display_name).as_deref(),
            Some("Alice")
        );
    }

    #[tokio::test]
    async fn test_fetch_token_requires_sign_in() {
        let strategy = strategy("http://unused/token".to_string(), None);
        strategy.initialize().await;

        let err = strategy.fetch_token("alice", "room1").await.unwrap_err();
        assert_eq!(err, AuthError::NotSignedIn);
    }

    #[tokio::test]
    async fn test_fetch_token_sends_id_token_and_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/token"))
            .and(query_param("identity", "alice"))
            .and(query_param("roomName", "room 1"))
            .and(header("Authorization", "id-token-uid-alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "attributes": { "token": "tok-fb" } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let strategy = strategy(format!("{}/token", server.uri()), None);
        strategy.sign_in(None).await.unwrap();

        let body = strategy.fetch_token("alice", "room 1").await.unwrap();
        assert_eq!(
            body.pointer("/data/attributes/token"),
            Some(&serde_json::json!("tok-fb"))
        );
    }

    #[tokio::test]
    async fn test_sign_out_clears_user() {
        let strategy = strategy("http://unused/token".to_string(), Some(alice()));
        strategy.initialize().await;

        strategy.sign_out().await.unwrap();

        assert!(strategy.user().is_none());
        assert!(strategy.is_auth_ready());
    }
}
