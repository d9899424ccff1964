//! Error types exposed by this crate.

use crate::rpc::Method;
use crate::NodeId;

/// Fatal is unrecoverable and shuts down a node at once.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[derive(serde::Deserialize, serde::Serialize)]
pub enum Fatal {
    #[error("panicked")]
    Panicked,

    /// The node stopped normally.
    #[error("Stopped normally")]
    Stopped,
}

/// No handler is registered for a `(path, method)` on a live node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[derive(serde::Deserialize, serde::Serialize)]
#[error("no handler for {method} {path} on node {address}")]
pub struct RouteError {
    pub address: NodeId,
    pub path: String,
    pub method: Method,
}

impl RouteError {
    pub fn new(
        address: impl ToString,
        path: impl ToString,
        method: Method,
    ) -> Self {
        Self {
            address: address.to_string(),
            path: path.to_string(),
            method,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("infallible")]
pub enum Infallible {}
