//! Election runtime configuration.

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use anyerror::AnyError;
use clap::Parser;
use rand::Rng;

use crate::config::errors::ConfigError;
use crate::config::VoteQuorum;

/// The configuration for a node and the simulated network it runs on.
///
/// All durations are in milliseconds. Only their order of magnitude matters:
/// `heartbeat_interval < election_timeout_min`, and the election timeout
/// has to leave room for a vote request to travel to a peer and back, i.e.,
/// `2 * network_delay + processing_delay + handler_delay`. Otherwise every
/// vote reply arrives after its sender gave up waiting.
#[derive(Clone, Debug, Parser)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct Config {
    /// The minimum election timeout in milliseconds
    #[clap(long, default_value = "150")]
    pub election_timeout_min: u64,

    /// The maximum election timeout in milliseconds
    #[clap(long, default_value = "300")]
    pub election_timeout_max: u64,

    /// The heartbeat interval in milliseconds at which leaders will send
    /// heartbeats to followers
    #[clap(long, default_value = "50")]
    pub heartbeat_interval: u64,

    /// The minimum wait in milliseconds before a candidate that collected no
    /// vote but its own retries with a new term
    #[clap(long, default_value = "100")]
    pub election_backoff_min: u64,

    /// The maximum wait in milliseconds before a lost election is retried
    #[clap(long, default_value = "900")]
    pub election_backoff_max: u64,

    /// One way latency in milliseconds the network adds to every delivery
    #[clap(long, default_value = "5")]
    pub network_delay: u64,

    /// Time in milliseconds a node spends on an inbound request before
    /// dispatching it to a handler
    #[clap(long, default_value = "3")]
    pub processing_delay: u64,

    /// Time in milliseconds a heartbeat or vote handler works before
    /// answering
    #[clap(long, default_value = "1")]
    pub handler_delay: u64,

    /// The rule deciding when a candidate has enough votes to lead
    #[clap(long, value_enum, default_value_t = VoteQuorum::SelfPlusOne)]
    pub vote_quorum: VoteQuorum,

    /// Whether a leader sends heartbeats to its peers.
    // clap 4 requires `num_args = 0..=1`, or it complains about missing arg
    // error https://github.com/clap-rs/clap/discussions/4374
    #[clap(long,
           default_value_t = true,
           action = clap::ArgAction::Set,
           num_args = 0..=1,
           default_missing_value = "true"
    )]
    pub enable_heartbeat: bool,

    /// Whether a follower will enter candidate state if it does not receive
    /// a heartbeat for a while.
    // clap 4 requires `num_args = 0..=1`, or it complains about missing arg
    // error https://github.com/clap-rs/clap/discussions/4374
    #[clap(long,
           default_value_t = true,
           action = clap::ArgAction::Set,
           num_args = 0..=1,
           default_missing_value = "true"
    )]
    pub enable_elect: bool,
}

/// Updatable config for a running node.
pub(crate) struct RuntimeConfig {
    pub(crate) enable_heartbeat: AtomicBool,
    pub(crate) enable_elect: AtomicBool,
}

impl RuntimeConfig {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            enable_heartbeat: AtomicBool::from(config.enable_heartbeat),
            enable_elect: AtomicBool::from(config.enable_elect),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        <Self as Parser>::parse_from(Vec::<&'static str>::new())
    }
}

impl Config {
    /// Generate a new random election timeout within the configured min & max.
    pub fn new_rand_election_timeout(&self) -> Duration {
        let ms = rand::thread_rng()
            .gen_range(self.election_timeout_min..self.election_timeout_max);

        Duration::from_millis(ms)
    }

    /// Generate a random wait before retrying a lost election.
    pub fn new_rand_backoff(&self) -> Duration {
        let ms = rand::thread_rng()
            .gen_range(self.election_backoff_min..self.election_backoff_max);

        Duration::from_millis(ms)
    }

    /// How long a single vote request may take before it counts as no vote.
    pub fn vote_timeout(&self) -> Duration {
        Duration::from_millis(self.election_timeout_min)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval)
    }

    pub fn network_delay(&self) -> Duration {
        Duration::from_millis(self.network_delay)
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay)
    }

    pub fn handler_delay(&self) -> Duration {
        Duration::from_millis(self.handler_delay)
    }

    /// Time for a vote request to reach a peer and for its reply to return.
    pub fn round_trip(&self) -> u64 {
        2 * self.network_delay + self.processing_delay + self.handler_delay
    }

    /// Build a `Config` instance from a series of command line arguments.
    ///
    /// The first element in `args` must be the application name.
    pub fn build(args: &[&str]) -> Result<Config, ConfigError> {
        let config = <Self as Parser>::try_parse_from(args).map_err(|e| {
            ConfigError::ParseError {
                source: AnyError::from(&e),
                args: args.iter().map(|x| x.to_string()).collect(),
            }
        })?;
        config.validate()
    }

    /// Validate the state of this config.
    pub fn validate(self) -> Result<Config, ConfigError> {
        if self.election_timeout_min >= self.election_timeout_max {
            return Err(ConfigError::ElectionTimeout {
                min: self.election_timeout_min,
                max: self.election_timeout_max,
            });
        }

        if self.election_timeout_min <= self.heartbeat_interval {
            return Err(ConfigError::ElectionTimeoutLTHeartBeat {
                election_timeout_min: self.election_timeout_min,
                heartbeat_interval: self.heartbeat_interval,
            });
        }

        if self.election_backoff_min >= self.election_backoff_max {
            return Err(ConfigError::Backoff {
                min: self.election_backoff_min,
                max: self.election_backoff_max,
            });
        }

        if self.election_timeout_min <= 2 * self.round_trip() {
            return Err(ConfigError::ElectionTimeoutLTRoundTrip {
                election_timeout_min: self.election_timeout_min,
                round_trip: self.round_trip(),
            });
        }

        Ok(self)
    }
}
