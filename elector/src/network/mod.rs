//! The network interface a node uses to reach its peers.

use openraft_macros::add_async_trait;

use crate::errors::RouteError;
use crate::rpc::Request;
use crate::rpc::Response;
use crate::NodeId;

/// A trait defining how a node sends a request to another node.
///
/// An implementation decides how a request travels, e.g., the in-memory
/// `pseudonet` adds artificial latency. It never retries.
///
/// A target that can not be reached is a normal condition and must be
/// answered with a non-ok [`Response`], typically
/// [`Response::unavailable()`]. `Err` is reserved for a [`RouteError`]
/// returned by the target's dispatcher: the target is alive but has no
/// handler for the request. The sender logs it and counts it as a failed
/// delivery.
///
/// Implementations are cloned into every outbound call and should be cheap to
/// clone, e.g., an `Arc` around the shared state.
#[add_async_trait]
pub trait Network: Clone + Send + Sync + 'static {
    /// Deliver `req` to `req.target` and return its response.
    ///
    /// `from` identifies the sender and is used for tracing only.
    async fn send(
        &self,
        from: &NodeId,
        req: Request,
    ) -> Result<Response, RouteError>;
}
