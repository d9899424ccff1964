//! Node metrics for observability.
//!
//! Metrics are observed on a running node via the
//! [`Node::metrics() -> watch::Receiver<Metrics>`](`crate::Node::metrics`)
//! method.
//!
//! Metrics is not a stream thus it only guarantees to provide the latest state
//! but not every change of the state.
//! Because internally, `watch::channel()` only stores one last state.

mod metrics;
mod server_state;
mod wait;

pub use metrics::Metrics;
pub use server_state::ServerState;
pub use wait::Wait;
pub use wait::WaitError;
