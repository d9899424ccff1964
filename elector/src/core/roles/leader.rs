use std::fmt;

use tokio::time::Instant;

use crate::core::TickHandle;

/// Leader state.
///
/// Once established, a leader never steps down. Dropping it stops the
/// heartbeat ticks.
pub(crate) struct Leader {
    /// The term in which this node won.
    pub(crate) term: u64,

    /// Votes granted when winning.
    pub(crate) granted: u64,

    pub(crate) established_at: Instant,

    /// Number of heartbeat broadcasts sent.
    pub(crate) broadcasts: u64,

    pub(crate) tick: TickHandle,
}

impl fmt::Display for Leader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Leader{{term:{}, granted:{}, broadcasts:{}, since:{:?}}}",
            self.term,
            self.granted,
            self.broadcasts,
            self.established_at.elapsed(),
        )
    }
}

impl Leader {
    pub(crate) fn new(term: u64, granted: u64, tick: TickHandle) -> Self {
        Self {
            term,
            granted,
            established_at: Instant::now(),
            broadcasts: 0,
            tick,
        }
    }
}
