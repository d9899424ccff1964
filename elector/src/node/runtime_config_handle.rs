//! RuntimeConfigHandle is an interface to change a node's runtime config.

use std::sync::atomic::Ordering;

use crate::node::NodeInner;

/// RuntimeConfigHandle is an interface to update runtime config.
///
/// These config are mainly designed for testing purpose and special use cases.
/// Usually you don't need to change runtime config.
pub struct RuntimeConfigHandle<'r> {
    node_inner: &'r NodeInner,
}

impl<'r> RuntimeConfigHandle<'r> {
    pub(in crate::node) fn new(node_inner: &'r NodeInner) -> Self {
        Self { node_inner }
    }

    /// Enable or disable heartbeats sent by a leader.
    ///
    /// Note that followers stop seeing a live leader and will start an
    /// election (if `Self::elect()` is enabled) after their election timeout.
    pub fn heartbeat(&self, enabled: bool) {
        self.node_inner
            .runtime_config
            .enable_heartbeat
            .store(enabled, Ordering::Relaxed);
    }

    /// Enable or disable election for a follower that has not received a
    /// heartbeat within its election timeout.
    pub fn elect(&self, enabled: bool) {
        self.node_inner
            .runtime_config
            .enable_elect
            .store(enabled, Ordering::Relaxed);
    }
}
