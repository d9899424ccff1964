#![allow(clippy::bool_assert_comparison)]

#[path = "../fixtures/mod.rs"]
mod fixtures;

mod t10_idempotent_heartbeat;
