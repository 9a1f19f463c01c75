//! Per-request bookkeeping for token fetches.
//!
//! Each `get_token` call gets its own [`RequestId`] and walks
//! `Pending -> Resolved | Failed | Abandoned`. The fetching flag is derived
//! from the pending set, so overlapping calls cannot clear each other's
//! state: the flag only drops once the last pending request settles.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::time::Instant;

/// Number of settled requests whose final state is kept for inspection.
const SETTLED_HISTORY: usize = 16;

/// Identifier of one token request, unique per tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Not issued by this tracker, or settled long enough ago to be forgotten.
    Idle,
    Pending,
    Resolved,
    Failed,
    /// The caller dropped the future before it settled.
    Abandoned,
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestState::Resolved | RequestState::Failed | RequestState::Abandoned
        )
    }
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    next_id: u64,
    pending: HashMap<RequestId, Instant>,
    settled: VecDeque<(RequestId, RequestState)>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending request.
    pub fn begin(&mut self) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        self.pending.insert(id, Instant::now());
        id
    }

    /// Move a pending request to a terminal state.
    ///
    /// Returns the time the request spent pending, or `None` if `id` was not
    /// pending (already settled or never issued). Non-terminal targets are
    /// ignored.
    pub fn settle(&mut self, id: RequestId, state: RequestState) -> Option<std::time::Duration> {
        if !state.is_terminal() {
            return None;
        }

        let started = self.pending.remove(&id)?;

        if self.settled.len() == SETTLED_HISTORY {
            self.settled.pop_front();
        }
        self.settled.push_back((id, state));

        Some(started.elapsed())
    }

    pub fn state(&self, id: RequestId) -> RequestState {
        if self.pending.contains_key(&id) {
            return RequestState::Pending;
        }

        self.settled
            .iter()
            .rev()
            .find(|(settled_id, _)| *settled_id == id)
            .map_or(RequestState::Idle, |(_, state)| *state)
    }

    /// True while any request is pending.
    pub fn is_fetching(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Most recently issued request, if any.
    pub fn latest(&self) -> Option<RequestId> {
        self.next_id.checked_sub(1).map(RequestId)
    }
}
