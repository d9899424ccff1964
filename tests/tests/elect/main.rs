#![allow(clippy::bool_assert_comparison)]

#[path = "../fixtures/mod.rs"]
mod fixtures;

// The number indicate the preferred running order for these case.
// The later tests may depend on the earlier ones.

mod t20_heartbeat_demotes_candidate;
mod t30_unreachable_peer;
mod t40_vote_quorum;
mod t50_leader_never_steps_down;
