//! Public interface of a node.
//!
//! [`Node`] serves as the primary interface to an election node,
//! facilitating all interactions with the underlying Core.
//!
//! While `Core` operates as a singleton within an application, [`Node`]
//! instances are designed to be cheaply cloneable.
//! This allows multiple components within the application that require
//! interaction with `Core` to efficiently share access.

mod handlers;
mod inner;
mod runtime_config_handle;


use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::sync::watch;
use tracing::info;
use tracing::trace_span;
use tracing::Instrument;
use tracing::Level;

pub(crate) use self::inner::NodeInner;
pub use self::runtime_config_handle::RuntimeConfigHandle;
use crate::config::Config;
use crate::config::RuntimeConfig;
use crate::core::core_state::CoreState;
use crate::core::io::api_message::APIMessage;
use crate::core::roles::vote_record::VoteRecord;
use crate::core::Core;
use crate::dispatch::Dispatcher;
use crate::errors::Fatal;
use crate::metrics::Metrics;
use crate::metrics::Wait;
use crate::rpc::VoteReply;
use crate::rpc::VoteRequest;
use crate::Network;
use crate::NodeId;

/// The election node API.
///
/// ### Clone
///
/// This type implements `Clone`, and cloning itself is very cheap and helps to
/// facilitate use with async workflows.
///
/// ### Shutting down
///
/// If any of the interfaces returns a [`Fatal`], this indicates that
/// the node is shutting down. If the parent application needs to
/// shutdown the node for any reason, calling `shutdown` will do the
/// trick.
#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

impl Node {
    /// Create and spawn a new election node task.
    ///
    /// ### `id`
    /// The ID, which is also the network address, the node uses to identify
    /// itself within the cluster.
    ///
    /// ### `config`
    /// The node's config, see the docs on the `Config` object for more
    /// details. The election timeout of this node is drawn from it once, at
    /// random. `config` must have passed [`Config::validate()`]: an empty
    /// timeout or backoff range panics.
    ///
    /// ### `network`
    /// An implementation of the [`Network`] trait which will be used
    /// by the node for sending requests to its peers.
    ///
    /// The node does not receive anything until [`Node::start()`] is called
    /// and its [`Dispatcher`] is reachable through the network.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn new<Net>(id: impl ToString, config: Arc<Config>, network: Net) -> Self
    where Net: Network {
        let id = id.to_string();

        let (tx_api, rx_api) = tokio::sync::mpsc::unbounded_channel();
        let (tx_notify, rx_notify) = tokio::sync::mpsc::unbounded_channel();
        let (tx_metrics, rx_metrics) =
            watch::channel(Metrics::new_initial(id.clone()));

        let runtime_config = Arc::new(RuntimeConfig::new(&config));

        let dispatcher = Dispatcher::new(&id, config.processing_delay());

        let core_span = tracing::span!(
            parent: tracing::Span::current(),
            Level::DEBUG,
            "Core",
            id = display(&id),
        );

        let core: Core<Net> = Core {
            id: id.clone(),
            config: config.clone(),
            election_timeout: config.new_rand_election_timeout(),
            runtime_config: runtime_config.clone(),
            network,

            peers: vec![],

            term: 0,
            votes: VoteRecord::default(),

            heartbeat_received: false,
            heartbeats_received: 0,
            liveness_signals: 0,

            generation: 0,
            votes_for_self: 0,
            watch_round: 0,

            candidate: None,
            leader: None,

            rx_api,

            tx_notification: tx_notify,
            rx_notification: rx_notify,

            tx_metrics,

            span: core_span,
        };

        let core_handle = tokio::spawn(
            core.main().instrument(trace_span!("spawn").or_current()),
        );

        let inner = NodeInner {
            id,
            config,
            runtime_config,
            dispatcher,
            tx_api,
            rx_metrics,
            core_state: std::sync::Mutex::new(CoreState::Running(core_handle)),
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    pub(in crate::node) fn from_inner(inner: Arc<NodeInner>) -> Self {
        Self { inner }
    }

    /// Register request handlers, remember the peers and start checking for
    /// heartbeats.
    ///
    /// `peers` are all other nodes of the cluster. A node started more than
    /// once replaces its peers and restarts its heartbeat check.
    pub async fn start(
        &self,
        peers: impl IntoIterator<Item = NodeId>,
    ) -> Result<(), Fatal> {
        let peers = peers.into_iter().collect::<Vec<_>>();

        info!(
            id = display(self.id()),
            peers = debug(&peers),
            "start node: {}",
            func_name!()
        );

        handlers::register(
            &self.inner.dispatcher,
            Arc::downgrade(&self.inner),
            self.inner.config.handler_delay(),
        );

        let (tx, rx) = oneshot::channel();
        self.inner.call_core(APIMessage::Start { peers, tx }, rx).await
    }

    /// Return a handle to update runtime config.
    ///
    /// Such enabling/disabling heartbeat, election, etc.
    ///
    /// Example:
    /// ```ignore
    /// let node = Node::new(...);
    /// node.runtime_config().heartbeat(true);
    /// node.runtime_config().elect(true);
    /// ```
    pub fn runtime_config(&self) -> RuntimeConfigHandle<'_> {
        RuntimeConfigHandle::new(self.inner.as_ref())
    }

    /// Return the ID of this node.
    pub fn id(&self) -> &NodeId {
        &self.inner.id
    }

    /// Return the config of this node.
    pub fn config(&self) -> &Arc<Config> {
        &self.inner.config
    }

    /// Return the dispatcher the network delivers this node's requests to.
    pub fn dispatcher(&self) -> Dispatcher {
        self.inner.dispatcher.clone()
    }

    /// Whether the Core task has not yet quit.
    pub fn is_running(&self) -> bool {
        self.inner.is_core_running()
    }

    /// Trigger election at once and return at once.
    ///
    /// Returns error when Core has [`Fatal`] error, e.g. shut down.
    /// It is not affected by `RuntimeConfigHandle::elect(false)`.
    /// It does nothing if the node is a leader, is already campaigning, or
    /// has received a heartbeat since the last check.
    pub async fn elect(&self) -> Result<(), Fatal> {
        let msg = APIMessage::Elect;
        self.inner.send_msg(msg).await?;
        Ok(())
    }

    /// Record a heartbeat from a leader.
    pub async fn handle_heartbeat(&self) -> Result<(), Fatal> {
        let (tx, rx) = oneshot::channel();
        self.inner.call_core(APIMessage::Heartbeat { tx }, rx).await
    }

    /// Submit a vote request from a candidate to this node.
    ///
    /// The vote is granted if this node has not voted in `rpc.term` yet.
    pub async fn handle_request_vote(
        &self,
        rpc: VoteRequest,
    ) -> Result<VoteReply, Fatal> {
        tracing::info!(rpc = display(&rpc), "handle_request_vote()");

        let (tx, rx) = oneshot::channel();
        let granted =
            self.inner.call_core(APIMessage::RequestVote { rpc, tx }, rx).await?;

        Ok(VoteReply {
            voted_for_you: granted,
        })
    }

    /// Stop the Core task and wait for it to quit.
    ///
    /// Returns the error Core quit with if it is not a normal stop.
    pub async fn shutdown(&self) -> Result<(), Fatal> {
        // An error means Core has already quit.
        let _ = self.inner.tx_api.send(APIMessage::Shutdown);

        let fatal = self.inner.join_core_task().await;
        match fatal {
            Fatal::Stopped => Ok(()),
            _ => Err(fatal),
        }
    }

    /// Get a handle to the metrics channel.
    pub fn metrics(&self) -> watch::Receiver<Metrics> {
        self.inner.rx_metrics.clone()
    }

    /// Get a handle to wait for the metrics to satisfy some condition.
    ///
    /// If `timeout` is `None`, then it will wait forever(10 years).
    /// If `timeout` is `Some`, then it will wait for the specified duration.
    ///
    /// ```ignore
    /// # use std::time::Duration;
    /// # use elector::{ServerState, Node};
    ///
    /// let timeout = Duration::from_millis(200);
    ///
    /// // wait for the node to win an election:
    /// n.wait(Some(timeout)).state(ServerState::Leader, "leader").await?;
    ///
    /// // wait for ever for the node to start its 2nd election:
    /// n.wait(None).term_at_least(2, "2nd election").await?;
    /// ```
    pub fn wait(&self, timeout: Option<Duration>) -> Wait {
        let timeout = match timeout {
            Some(t) => t,
            None => Duration::from_secs(86400 * 365 * 100),
        };
        Wait {
            timeout,
            rx: self.inner.rx_metrics.clone(),
        }
    }
}
