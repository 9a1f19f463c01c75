//! Mock identity provider.
//!
//! # Example
//!
//! ```rust,ignore
//! let provider = MockIdentityProvider::builder()
//!     .with_restored_user(test_user())
//!     .build();
//! ```

use crate::fixtures::test_user;
use app_state::auth::{IdentityProvider, User};
use app_state::AuthError;
use common::secret::SecretString;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Identity provider answering from fixed configuration.
///
/// ID tokens are `id-token-{uid}`.
#[derive(Debug, Default)]
pub struct MockIdentityProvider {
    restored_user: Option<User>,
    sign_in_error: Option<AuthError>,
    sign_ins: AtomicUsize,
    sign_outs: AtomicUsize,
}

impl MockIdentityProvider {
    #[must_use]
    pub fn builder() -> MockIdentityProviderBuilder {
        MockIdentityProviderBuilder::default()
    }

    /// Provider with no restored session whose sign-in yields [`test_user`].
    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn sign_in_count(&self) -> usize {
        self.sign_ins.load(Ordering::SeqCst)
    }

    pub fn sign_out_count(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn current_user(&self) -> Result<Option<User>, AuthError> {
        Ok(self.restored_user.clone())
    }

    async fn sign_in(&self) -> Result<User, AuthError> {
        self.sign_ins.fetch_add(1, Ordering::SeqCst);
        match &self.sign_in_error {
            Some(err) => Err(err.clone()),
            None => Ok(test_user()),
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn id_token(&self, user: &User) -> Result<SecretString, AuthError> {
        let uid = user.uid.as_deref().ok_or(AuthError::NotSignedIn)?;
        Ok(SecretString::from(format!("id-token-{uid}")))
    }
}

#[derive(Debug, Default)]
pub struct MockIdentityProviderBuilder {
    restored_user: Option<User>,
    sign_in_error: Option<AuthError>,
}

impl MockIdentityProviderBuilder {
    /// Report `user` as an existing session.
    #[must_use]
    pub fn with_restored_user(mut self, user: User) -> Self {
        self.restored_user = Some(user);
        self
    }

    /// Fail interactive sign-in with `err`.
    #[must_use]
    pub fn failing_sign_in(mut self, err: AuthError) -> Self {
        self.sign_in_error = Some(err);
        self
    }

    #[must_use]
    pub fn build(self) -> MockIdentityProvider {
        MockIdentityProvider {
            restored_user: self.restored_user,
            sign_in_error: self.sign_in_error,
            ..MockIdentityProvider::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TEST_ID_TOKEN;
    use common::secret::ExposeSecret;

    #[tokio::test]
    async fn test_id_token_uses_uid() {
        let provider = MockIdentityProvider::signed_out();
        let token = provider.id_token(&test_user()).await.unwrap();
        assert_eq!(token.expose_secret(), TEST_ID_TOKEN);
    }

    #[tokio::test]
    async fn test_failing_sign_in() {
        let provider = MockIdentityProvider::builder()
            .failing_sign_in(AuthError::Provider("popup closed".to_string()))
            .build();

        assert!(provider.sign_in().await.is_err());
        assert_eq!(provider.sign_in_count(), 1);
    }
}
