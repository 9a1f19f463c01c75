//! Auth strategy driven by the test.
//!
//! Every `fetch_token` call parks until the test answers it, which makes
//! pending and overlapping requests deterministic.
//!
//! # Example
//!
//! ```rust,ignore
//! let (strategy, mut calls) = ControlledStrategy::new(AuthMode::NoAuth);
//! let provider = AppStateProvider::with_strategy(Arc::new(strategy), None);
//!
//! let fut = tokio::spawn(provider.state().get_token("alice", "room1"));
//! let call = calls.next_call().await;
//! call.respond(Ok(token_body("tok")));
//! ```

use app_state::auth::AuthStrategy;
use app_state::{AuthError, AuthMode};
use tokio::sync::{mpsc, oneshot};

type TokenReply = Result<serde_json::Value, AuthError>;

/// A parked `fetch_token` call.
#[derive(Debug)]
pub struct PendingCall {
    pub identity: String,
    pub room_name: String,
    reply: oneshot::Sender<TokenReply>,
}

impl PendingCall {
    /// Complete the call. Ignored if the caller has gone away.
    pub fn respond(self, reply: TokenReply) {
        let _ = self.reply.send(reply);
    }

    /// True once the caller stopped waiting for this call.
    pub fn is_abandoned(&self) -> bool {
        self.reply.is_closed()
    }
}

/// Receiving side of a [`ControlledStrategy`].
pub struct CallQueue {
    calls: mpsc::UnboundedReceiver<PendingCall>,
}

impl CallQueue {
    /// Wait for the next `fetch_token` call.
    pub async fn next_call(&mut self) -> PendingCall {
        self.calls
            .recv()
            .await
            .expect("strategy dropped before making a call")
    }
}

pub struct ControlledStrategy {
    mode: AuthMode,
    calls: mpsc::UnboundedSender<PendingCall>,
}

impl ControlledStrategy {
    pub fn new(mode: AuthMode) -> (Self, CallQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { mode, calls: tx }, CallQueue { calls: rx })
    }
}

#[async_trait::async_trait]
impl AuthStrategy for ControlledStrategy {
    fn mode(&self) -> AuthMode {
        self.mode
    }

    async fn fetch_token(&self, identity: &str, room_name: &str) -> TokenReply {
        let (tx, rx) = oneshot::channel();
        self.calls
            .send(PendingCall {
                identity: identity.to_string(),
                room_name: room_name.to_string(),
                reply: tx,
            })
            .map_err(|_| AuthError::Transport("call queue closed".to_string()))?;

        rx.await
            .map_err(|_| AuthError::Transport("call dropped without reply".to_string()))?
    }
}
