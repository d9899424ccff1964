use std::fmt;

/// A message coming from the internal components.
pub(crate) enum Notification {
    /// The election timeout of a heartbeat check round has elapsed.
    WatchTimeout {
        /// The check round that scheduled this timeout.
        round: u64,
    },

    /// All vote requests of an election round have settled.
    VotesCollected {
        /// The election round these votes belong to.
        generation: u64,

        /// Number of peers that granted the vote.
        granted: u64,
    },

    /// The backoff after a lost election round has elapsed.
    BackoffElapsed { generation: u64 },

    /// A tick event to wake up Core to send heartbeats.
    Tick {
        /// ith tick
        i: u64,
    },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WatchTimeout { round } => {
                write!(f, "WatchTimeout: round={}", round)
            }
            Self::VotesCollected {
                generation,
                granted,
            } => {
                write!(
                    f,
                    "VotesCollected: generation={}, granted={}",
                    generation, granted
                )
            }
            Self::BackoffElapsed { generation } => {
                write!(f, "BackoffElapsed: generation={}", generation)
            }
            Self::Tick { i } => {
                write!(f, "Tick {}", i)
            }
        }
    }
}
