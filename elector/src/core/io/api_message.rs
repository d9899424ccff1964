use std::fmt;

use tokio::sync::oneshot;

use crate::rpc::VoteRequest;
use crate::NodeId;

/// A message sent by application or by a request handler to the [`Core`].
///
/// [`Core`]: crate::core::Core
pub(crate) enum APIMessage {
    /// Register peers and start watching for heartbeats.
    Start {
        peers: Vec<NodeId>,
        tx: oneshot::Sender<()>,
    },

    /// A heartbeat from a leader has arrived.
    Heartbeat { tx: oneshot::Sender<()> },

    /// A candidate asks for the vote. Replies whether the vote is granted.
    RequestVote {
        rpc: VoteRequest,
        tx: oneshot::Sender<bool>,
    },

    /// Start an election at once, without waiting for a timeout.
    Elect,

    /// Stop the core.
    Shutdown,
}

impl fmt::Display for APIMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            APIMessage::Start { peers, .. } => {
                write!(f, "Start with peers: {:?}", peers)
            }
            APIMessage::Heartbeat { .. } => {
                write!(f, "Heartbeat")
            }
            APIMessage::RequestVote { rpc, .. } => {
                write!(f, "RequestVote: {}", rpc)
            }
            APIMessage::Elect => {
                write!(f, "Elect")
            }
            APIMessage::Shutdown => {
                write!(f, "Shutdown")
            }
        }
    }
}
