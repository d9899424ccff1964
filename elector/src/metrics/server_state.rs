/// The role a node plays in the election protocol.
#[derive(Debug, Clone, Copy, Default)]
#[derive(PartialEq, Eq)]
#[derive(derive_more::Display)]
#[derive(serde::Deserialize, serde::Serialize)]
pub enum ServerState {
    /// The node is waiting for heartbeats from a leader.
    #[default]
    #[display("follower")]
    Follower,
    /// The node is campaigning to become the cluster leader.
    #[display("candidate")]
    Candidate,
    /// The node won an election and sends heartbeats.
    #[display("leader")]
    Leader,
}
