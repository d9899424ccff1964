//! Per-node request dispatching.
//!
//! A [`Dispatcher`] is what the network delivers requests to. It owns the
//! simulated inbound processing delay and maps `(path, method)` to handlers.
//! It knows nothing about elections.


use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::debug;
use tracing::error;

use crate::errors::RouteError;
use crate::rpc::Method;
use crate::rpc::Request;
use crate::rpc::Response;
use crate::NodeId;

/// A request handler registered on a [`Dispatcher`].
pub type Handler =
    Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// Identifies a handler: a path and a method.
#[derive(Debug, Clone)]
#[derive(PartialEq, Eq, PartialOrd, Ord)]
pub struct Route {
    pub path: String,
    pub method: Method,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Routes inbound requests of one node to its handlers.
///
/// Cloning is cheap, all clones share the same handler table.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    address: NodeId,
    processing_delay: Duration,
    handlers: Mutex<BTreeMap<Route, Handler>>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("address", &self.inner.address)
            .field("processing_delay", &self.inner.processing_delay)
            .field("routes", &self.routes())
            .finish()
    }
}

impl Dispatcher {
    pub fn new(address: impl ToString, processing_delay: Duration) -> Self {
        let inner = DispatcherInner {
            address: address.to_string(),
            processing_delay,
            handlers: Mutex::new(BTreeMap::new()),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn address(&self) -> &NodeId {
        &self.inner.address
    }

    /// Register `handler` for `path` and `method`, replacing any handler
    /// previously registered for the same pair.
    pub fn register_handler<F, Fut>(
        &self,
        path: impl ToString,
        method: Method,
        handler: F,
    ) where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let route = Route {
            path: path.to_string(),
            method,
        };

        debug!(
            address = display(&self.inner.address),
            route = display(&route),
            "register handler"
        );

        let handler: Handler = Arc::new(move |req| handler(req).boxed());

        let mut handlers = self.inner.handlers.lock().unwrap();
        handlers.insert(route, handler);
    }

    /// All registered routes.
    pub fn routes(&self) -> Vec<Route> {
        let handlers = self.inner.handlers.lock().unwrap();
        handlers.keys().cloned().collect()
    }

    /// Process an inbound request.
    ///
    /// It spends the processing delay, then invokes the handler registered
    /// for the request's path and method. A request without a handler is a
    /// wiring bug and is returned as a [`RouteError`].
    pub async fn receive(&self, req: Request) -> Result<Response, RouteError> {
        tokio::time::sleep(self.inner.processing_delay).await;

        let handler = {
            let handlers = self.inner.handlers.lock().unwrap();
            let route = Route {
                path: req.path.clone(),
                method: req.method,
            };
            handlers.get(&route).cloned()
        };

        let Some(handler) = handler else {
            let err =
                RouteError::new(&self.inner.address, &req.path, req.method);
            error!(error = display(&err), "failed to dispatch {}", req);
            return Err(err);
        };

        Ok(handler(req).await)
    }
}
