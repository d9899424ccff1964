#![doc = include_str!("lib_readme.md")]
#![allow(clippy::bool_assert_comparison)]
#![allow(clippy::bool_comparison)]
#![allow(clippy::result_large_err)]
#![allow(clippy::type_complexity)]
#![deny(unused_qualifications)]

macro_rules! func_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let n = &name[..name.len() - 3];
        let nn = n.replace("::{{closure}}", "");
        nn
    }};
}

pub extern crate openraft_macros;

mod config;
mod core;

pub mod dispatch;
pub mod errors;
pub mod metrics;
pub mod network;
pub mod node;
pub mod rpc;

pub use anyerror;
pub use anyerror::AnyError;
pub use openraft_macros::add_async_trait;

pub use crate::config::Config;
pub use crate::config::ConfigError;
pub use crate::config::VoteQuorum;
pub use crate::dispatch::Dispatcher;
pub use crate::metrics::Metrics;
pub use crate::metrics::ServerState;
pub use crate::network::Network;
pub use crate::node::Node;

/// Identifies a node. It is also the node's address on the network.
pub type NodeId = String;
