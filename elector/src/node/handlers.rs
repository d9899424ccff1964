//! Request handlers a node registers on its dispatcher.
//!
//! A handler holds a weak reference to the node so that the dispatcher, which
//! is shared with the network, does not keep a node alive.

use std::sync::Weak;
use std::time::Duration;

use tracing::warn;

use crate::dispatch::Dispatcher;
use crate::node::Node;
use crate::node::NodeInner;
use crate::rpc::Method;
use crate::rpc::Request;
use crate::rpc::Response;
use crate::rpc::VoteReply;
use crate::rpc::VoteRequest;
use crate::rpc::HEARTBEAT_PATH;
use crate::rpc::VOTE_PATH;

/// Register the heartbeat and the vote handler of a node.
pub(in crate::node) fn register(
    dispatcher: &Dispatcher,
    node: Weak<NodeInner>,
    handler_delay: Duration,
) {
    let n = node.clone();
    dispatcher.register_handler(HEARTBEAT_PATH, Method::Get, move |req| {
        heartbeat(n.clone(), handler_delay, req)
    });

    dispatcher.register_handler(VOTE_PATH, Method::Post, move |req| {
        request_vote(node.clone(), handler_delay, req)
    });
}

/// Handle `GET /heartbeat`.
///
/// Always `200 OK` as long as the node is running.
async fn heartbeat(
    node: Weak<NodeInner>,
    handler_delay: Duration,
    _req: Request,
) -> Response {
    tokio::time::sleep(handler_delay).await;

    let Some(node) = node.upgrade().map(Node::from_inner) else {
        return Response::internal_error();
    };

    match node.handle_heartbeat().await {
        Ok(()) => Response::ok(),
        Err(fatal) => {
            warn!("{} can not handle heartbeat: {}", node.id(), fatal);
            Response::internal_error()
        }
    }
}

/// Handle `POST /vote`.
///
/// A missing or malformed body is a `400 Bad Request` and changes nothing.
async fn request_vote(
    node: Weak<NodeInner>,
    handler_delay: Duration,
    req: Request,
) -> Response {
    tokio::time::sleep(handler_delay).await;

    let Some(node) = node.upgrade().map(Node::from_inner) else {
        return Response::internal_error();
    };

    let Some(body) = req.body.as_deref() else {
        warn!("{} received a vote request without body", node.id());
        return Response::bad_request();
    };

    let rpc: VoteRequest = match serde_json::from_str(body) {
        Ok(rpc) => rpc,
        Err(e) => {
            warn!(
                error = display(&e),
                "{} received a malformed vote request: {}",
                node.id(),
                body
            );
            return Response::bad_request();
        }
    };

    let reply = match node.handle_request_vote(rpc).await {
        Ok(reply) => reply,
        Err(fatal) => {
            warn!("{} can not handle vote request: {}", node.id(), fatal);
            return Response::internal_error();
        }
    };

    match serde_json::to_string(&reply) {
        Ok(body) => Response::ok_with(body),
        Err(e) => {
            warn!("{} failed to encode {}: {}", node.id(), reply, e);
            Response::internal_error()
        }
    }
}
