use std::fmt;

use crate::NodeId;

/// Body of a `POST /vote`: a candidate asking for a vote in `term`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct VoteRequest {
    pub term: u64,
    pub candidate: NodeId,
}

impl fmt::Display for VoteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{term:{}, candidate:{}}}", self.term, self.candidate)
    }
}

impl VoteRequest {
    pub fn new(term: u64, candidate: impl ToString) -> Self {
        Self {
            term,
            candidate: candidate.to_string(),
        }
    }
}

/// Body of the response to a [`VoteRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReply {
    pub voted_for_you: bool,
}

impl fmt::Display for VoteReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{votedForYou:{}}}", self.voted_for_you)
    }
}
