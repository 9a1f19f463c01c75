//! Scoped access to the published [`AppState`].
//!
//! Code running inside [`AppStateProvider::scope`] (or `sync_scope`) reaches
//! the state through [`use_app_state`]. Outside a scope the accessor fails
//! with [`AppStateError::OutsideProvider`].
//!
//! The scope is task-local: tasks spawned from inside a scope do not inherit
//! it and must be wrapped in their own scope.

use crate::errors::AppStateError;
use crate::provider::{AppState, AppStateProvider};
use std::future::Future;

tokio::task_local! {
    static APP_STATE: AppState;
}

/// Current provider's state.
///
/// # Errors
///
/// Returns `AppStateError::OutsideProvider` if called outside a provider
/// scope.
pub fn use_app_state() -> Result<AppState, AppStateError> {
    APP_STATE
        .try_with(AppState::clone)
        .map_err(|_| AppStateError::OutsideProvider)
}

impl AppStateProvider {
    /// Run `fut` with this provider's state in scope.
    pub async fn scope<F>(&self, fut: F) -> F::Output
    where
        F: Future,
    {
        APP_STATE.scope(self.state(), fut).await
    }

    /// Run `f` with this provider's state in scope.
    pub fn sync_scope<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        APP_STATE.sync_scope(self.state(), f)
    }
}
