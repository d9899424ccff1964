use std::fmt;

use tokio::time::Instant;
use tracing::info;

/// Candidate: the tally of one election round.
///
/// A new round is created every time this node starts, or retries, an
/// election. Results of vote requests sent in another round are identified by
/// `generation` and are discarded.
#[derive(Clone, Debug)]
#[derive(PartialEq, Eq)]
pub(crate) struct Candidate {
    /// Identifies this round among all rounds started by this node.
    pub(crate) generation: u64,

    /// The term this round campaigns for.
    pub(crate) term: u64,

    /// When the round is started.
    starting_time: Instant,

    /// Number of granted votes, including the vote for itself if recorded.
    granted: u64,

    /// Whether all vote requests have settled.
    collected: bool,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{term:{}, generation:{}, granted:{}{}, elapsed:{:?}}}",
            self.term,
            self.generation,
            self.granted,
            if self.collected { "" } else { "+" },
            self.starting_time.elapsed(),
        )
    }
}

impl Candidate {
    pub(crate) fn new(generation: u64, term: u64, self_granted: bool) -> Self {
        let c = Self {
            generation,
            term,
            starting_time: Instant::now(),
            granted: u64::from(self_granted),
            collected: false,
        };
        info!("new candidate: {}", c);
        c
    }

    /// Add the votes granted by peers once all vote requests have settled.
    pub(crate) fn collect(&mut self, granted_by_peers: u64) -> u64 {
        self.granted += granted_by_peers;
        self.collected = true;
        self.granted
    }

    pub(crate) fn granted(&self) -> u64 {
        self.granted
    }

    pub(crate) fn is_collected(&self) -> bool {
        self.collected
    }
}
