use std::collections::BTreeMap;
use std::sync::Arc;

use elector::errors::Fatal;
use elector::Config;
use elector::ConfigError;
use elector::Node;
use elector::NodeId;
use elector::ServerState;
use futures::future::join_all;
use tracing::info;

use crate::PseudoNet;

/// A set of nodes connected by one [`PseudoNet`].
///
/// Nodes are named `node-0`, `node-1`, ... and every node's peers are all the
/// other nodes.
pub struct Cluster {
    net: PseudoNet,
    nodes: BTreeMap<NodeId, Node>,
}

impl Cluster {
    /// Create `n` nodes and register them on a new network with the delay of
    /// `config.network_delay`.
    ///
    /// Nodes are not started. `config` is validated first, so that no node is
    /// created with an empty timeout or backoff range.
    pub fn new(n: usize, config: Arc<Config>) -> Result<Self, ConfigError> {
        Config::clone(&config).validate()?;

        let net = PseudoNet::new(config.network_delay());

        let mut nodes = BTreeMap::new();
        for i in 0..n {
            let id = format!("node-{}", i);
            let node = Node::new(&id, config.clone(), net.clone());
            net.register(node.dispatcher());
            nodes.insert(id, node);
        }

        Ok(Self { net, nodes })
    }

    /// Start every node with all other nodes as its peers.
    pub async fn start_all(&self) -> Result<(), Fatal> {
        let ids = self.ids();
        info!("start cluster: {:?}", ids);

        let starts = self.nodes.values().map(|node| {
            let peers =
                ids.iter().filter(|id| *id != node.id()).cloned().collect::<Vec<_>>();
            node.start(peers)
        });

        for res in join_all(starts).await {
            res?;
        }
        Ok(())
    }

    pub fn net(&self) -> &PseudoNet {
        &self.net
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.keys().cloned().collect()
    }

    /// IDs of the nodes that are currently leaders.
    pub fn leaders(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.metrics().borrow().server_state == ServerState::Leader)
            .map(|n| n.id().clone())
            .collect()
    }

    /// Shut down every node.
    ///
    /// Returns the first error a node quit with other than a normal stop.
    pub async fn shutdown(&self) -> Result<(), Fatal> {
        let results = join_all(self.nodes.values().map(|n| n.shutdown())).await;

        for res in results {
            res?;
        }
        Ok(())
    }
}
