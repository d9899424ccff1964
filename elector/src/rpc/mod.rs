//! Request and response types carried by the simulated network.
//!
//! They are shaped like HTTP: a request names a target node, a path
//! and a method, and carries an optional JSON body. No bytes ever hit a socket.

mod method;
mod request;
mod response;
mod status_code;
mod vote;


pub use method::Method;
pub use request::Request;
pub use response::Response;
pub use status_code::StatusCode;
pub use vote::VoteReply;
pub use vote::VoteRequest;

/// Liveness signal sent by a leader, `GET` only.
pub const HEARTBEAT_PATH: &str = "/heartbeat";

/// Vote request sent by a candidate, `POST` only.
pub const VOTE_PATH: &str = "/vote";
