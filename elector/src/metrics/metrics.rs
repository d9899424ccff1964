use std::collections::BTreeMap;
use std::fmt;

use crate::errors::Fatal;
use crate::metrics::ServerState;
use crate::NodeId;

/// A set of metrics describing the current state of a node.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct Metrics {
    pub running_state: Result<(), Fatal>,

    /// The ID of the node.
    pub id: NodeId,

    /// The term of the last election this node started.
    pub term: u64,

    /// The role of the node.
    pub server_state: ServerState,

    /// Whether a heartbeat arrived since the last timeout check.
    pub heartbeat_received: bool,

    /// An election started by this node has not yet finished: it is either
    /// collecting votes or backing off before retrying.
    pub election_in_progress: bool,

    /// Increases every time an election starts or is abandoned.
    pub election_generation: u64,

    /// Votes granted to this node in its latest election, its own included.
    pub votes_for_self: u64,

    /// Whom this node voted for, by term.
    pub votes: BTreeMap<u64, NodeId>,

    /// Number of heartbeats received.
    pub heartbeats_received: u64,

    /// Number of check intervals in which at least one heartbeat arrived.
    ///
    /// Heartbeats arriving within the same interval count once.
    pub liveness_signals: u64,
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Metrics{{")?;

        write!(
            f,
            "id:{}, {}, term:{}, votes_for_self:{}, electing:{}(gen {})",
            self.id,
            self.server_state,
            self.term,
            self.votes_for_self,
            self.election_in_progress,
            self.election_generation,
        )?;

        write!(
            f,
            ", heartbeat:{{received:{}, total:{}, liveness:{}}}",
            self.heartbeat_received,
            self.heartbeats_received,
            self.liveness_signals
        )?;

        write!(f, ", votes:{{")?;
        for (i, (term, candidate)) in self.votes.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}:{}", term, candidate)?;
        }
        write!(f, "}}")?;

        if let Err(e) = &self.running_state {
            write!(f, ", fatal:{}", e)?;
        }

        write!(f, "}}")?;
        Ok(())
    }
}

impl Metrics {
    pub fn new_initial(id: NodeId) -> Self {
        Self {
            running_state: Ok(()),
            id,

            term: 0,
            server_state: ServerState::Follower,

            heartbeat_received: false,
            election_in_progress: false,
            election_generation: 0,
            votes_for_self: 0,
            votes: BTreeMap::new(),

            heartbeats_received: 0,
            liveness_signals: 0,
        }
    }
}
