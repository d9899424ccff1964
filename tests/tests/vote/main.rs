#![allow(clippy::bool_assert_comparison)]

#[path = "../fixtures/mod.rs"]
mod fixtures;

mod t10_single_vote_per_term;
mod t20_bad_vote_request;
