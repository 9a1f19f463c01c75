//! Observability for the client application state.
//!
//! Metrics are recorded through the `metrics` facade; the embedding
//! application decides which recorder (if any) is installed.

pub mod metrics;
