use tracing::debug;
use tracing::error;
use tracing::warn;
use tracing::Instrument;

use crate::core::roles::leader::Leader;
use crate::rpc::Request;
use crate::rpc::HEARTBEAT_PATH;
use crate::Config;
use crate::Network;
use crate::NodeId;

/// Handle leader operations.
///
/// - Heartbeat
pub(crate) struct LeaderHandler<'x, Net>
where Net: Network
{
    pub(crate) id: &'x NodeId,
    pub(crate) config: &'x Config,
    pub(crate) network: &'x Net,
    pub(crate) peers: &'x [NodeId],
    pub(crate) leader: &'x mut Leader,
}

impl<'x, Net> LeaderHandler<'x, Net>
where Net: Network
{
    /// Send a heartbeat to every peer without waiting for the responses.
    pub(crate) fn broadcast_heartbeat(&mut self) {
        self.leader.broadcasts += 1;

        debug!(
            "id={} broadcast heartbeat #{} to {} peers",
            self.id,
            self.leader.broadcasts,
            self.peers.len()
        );

        for target in self.peers.iter() {
            self.send_heartbeat(target);
        }
    }

    pub(crate) fn send_heartbeat(&self, target: &NodeId) {
        let id = self.id.clone();
        let req = Request::get(target, HEARTBEAT_PATH);
        let timeout = self.config.vote_timeout();
        let network = self.network.clone();

        let fu = async move {
            let res = tokio::time::timeout(timeout, network.send(&id, req))
                .await
                .map_err(|_elapsed| timeout);

            match res {
                Ok(Ok(resp)) if resp.ok => {
                    debug!("id={} sent a heartbeat: {}", id, resp);
                }
                Ok(Ok(resp)) => {
                    warn!("id={} failed to send a heartbeat: {}", id, resp);
                }
                Ok(Err(route_error)) => {
                    error!("id={} heartbeat not routed: {}", id, route_error);
                }
                Err(elapsed) => {
                    warn!(
                        "id={} heartbeat not answered in {:?}",
                        id, elapsed
                    );
                }
            }
        };

        let span = tracing::debug_span!("heartbeat", target = display(target));
        tokio::spawn(fu.instrument(span));
    }
}
