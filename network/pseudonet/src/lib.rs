//! An in-memory network that connects [`elector`] nodes within one process.
//!
//! Every delivery takes the configured delay on the way to the target and
//! again on the way back.

mod cluster;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

pub use cluster::Cluster;
use elector::errors::RouteError;
use elector::rpc::Request;
use elector::rpc::Response;
use elector::Dispatcher;
use elector::Network;
use elector::NodeId;
use tracing::debug;
use tracing::warn;

/// A simulated network: a registry of addresses to dispatchers.
///
/// Cloning is cheap, all clones share the same registry.
#[derive(Default, Clone)]
pub struct PseudoNet {
    inner: Arc<Mutex<PseudoNetInner>>,
}

#[derive(Default)]
struct PseudoNetInner {
    /// One way latency of every delivery.
    delay: Duration,

    /// Per target latency, overrides `delay`.
    delays: BTreeMap<NodeId, Duration>,

    dispatchers: BTreeMap<NodeId, Dispatcher>,
}

impl PseudoNet {
    pub fn new(delay: Duration) -> Self {
        let inner = PseudoNetInner {
            delay,
            ..Default::default()
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Make `dispatcher` reachable at its address.
    ///
    /// Registering an address twice replaces the earlier dispatcher.
    pub fn register(&self, dispatcher: Dispatcher) {
        let mut inner = self.inner.lock().unwrap();
        let address = dispatcher.address().clone();

        debug!("register {}", address);
        inner.dispatchers.insert(address, dispatcher);
    }

    /// Make `address` unreachable.
    pub fn unregister(&self, address: &str) -> Option<Dispatcher> {
        let mut inner = self.inner.lock().unwrap();
        debug!("unregister {}", address);
        inner.dispatchers.remove(address)
    }

    pub fn is_registered(&self, address: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.dispatchers.contains_key(address)
    }

    /// Set the one way latency of deliveries to and from `address`.
    ///
    /// `None` restores the default latency.
    pub fn set_delay(&self, address: &str, delay: Option<Duration>) {
        let mut inner = self.inner.lock().unwrap();
        match delay {
            Some(d) => {
                inner.delays.insert(address.to_string(), d);
            }
            None => {
                inner.delays.remove(address);
            }
        }
    }

    fn route(&self, address: &str) -> (Option<Dispatcher>, Duration) {
        let inner = self.inner.lock().unwrap();
        let dispatcher = inner.dispatchers.get(address).cloned();
        let delay = inner.delays.get(address).copied().unwrap_or(inner.delay);
        (dispatcher, delay)
    }
}

impl Network for PseudoNet {
    /// Deliver a request.
    ///
    /// An unregistered target is answered at once with
    /// `503 Service Unavailable`, without any delay.
    async fn send(
        &self,
        from: &NodeId,
        req: Request,
    ) -> Result<Response, RouteError> {
        let (dispatcher, delay) = self.route(&req.target);

        let Some(dispatcher) = dispatcher else {
            warn!("{} -> {}: unreachable", from, req.url());
            return Ok(Response::unavailable());
        };

        debug!("{} -> {}", from, req.url());

        let url = req.url();

        tokio::time::sleep(delay).await;
        let resp = dispatcher.receive(req).await?;
        tokio::time::sleep(delay).await;

        debug!("{} <- {}: {}", from, url, resp);

        Ok(resp)
    }
}
