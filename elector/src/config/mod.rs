#[allow(clippy::module_inception)]
mod config;
mod errors;
mod vote_quorum;


pub use config::Config;
pub(crate) use config::RuntimeConfig;
pub use errors::ConfigError;
pub use vote_quorum::VoteQuorum;
