use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing::Instrument;
use tracing::Level;
use tracing::Span;

use crate::config::Config;
use crate::config::RuntimeConfig;
use crate::core::io::api_message::APIMessage;
use crate::core::io::notification::Notification;
use crate::core::roles::candidate::Candidate;
use crate::core::roles::leader::Leader;
use crate::core::roles::leader_handler::LeaderHandler;
use crate::core::roles::vote_record::VoteRecord;
use crate::core::Tick;
use crate::errors::Fatal;
use crate::errors::Infallible;
use crate::metrics::Metrics;
use crate::metrics::ServerState;
use crate::network::Network;
use crate::rpc::Request;
use crate::rpc::VoteReply;
use crate::rpc::VoteRequest;
use crate::rpc::VOTE_PATH;
use crate::NodeId;

/// The core type implementing the election protocol.
///
/// It is the only owner of the election state of a node.
pub struct Core<Net>
where Net: Network
{
    /// This node's ID.
    pub(crate) id: NodeId,

    /// This node's runtime config.
    pub(crate) config: Arc<Config>,

    /// The interval between two heartbeat checks, chosen at random once per
    /// node so that nodes do not time out together.
    pub(crate) election_timeout: Duration,

    pub(crate) runtime_config: Arc<RuntimeConfig>,

    /// The [`Network`] implementation.
    pub(crate) network: Net,

    /// All other nodes of the cluster, set when the node starts.
    pub(crate) peers: Vec<NodeId>,

    /// The term of the latest election started by this node.
    pub(crate) term: u64,

    pub(crate) votes: VoteRecord,

    /// Set by a heartbeat, cleared by the heartbeat check.
    pub(crate) heartbeat_received: bool,

    pub(crate) heartbeats_received: u64,

    pub(crate) liveness_signals: u64,

    /// Increases every time an election round starts or is abandoned.
    pub(crate) generation: u64,

    /// Votes for self in the latest election round.
    pub(crate) votes_for_self: u64,

    /// Identifies the only heartbeat check that is still valid.
    pub(crate) watch_round: u64,

    /// Represents the Candidate state: an election is in progress.
    ///
    /// It is kept during the backoff between two rounds.
    pub(crate) candidate: Option<Candidate>,

    /// Represents the Leader state.
    pub(crate) leader: Option<Box<Leader>>,

    pub(crate) rx_api: mpsc::UnboundedReceiver<APIMessage>,

    /// A Sender to send callback by other components to [`Core`], when an
    /// action is finished, such as collecting votes or a timer firing.
    pub(crate) tx_notification: mpsc::UnboundedSender<Notification>,

    /// A Receiver to receive callback from other components.
    pub(crate) rx_notification: mpsc::UnboundedReceiver<Notification>,

    pub(crate) tx_metrics: watch::Sender<Metrics>,

    pub(crate) span: Span,
}

impl<Net> Core<Net>
where Net: Network
{
    /// The main loop of the election protocol.
    pub(crate) async fn main(mut self) -> Result<Infallible, Fatal> {
        debug!("election node started");

        // Initialize metrics
        self.report_metrics();

        let span = tracing::span!(parent: &self.span, Level::DEBUG, "main");
        let res = self.runtime_loop().instrument(span).await;

        // Stop sending heartbeats
        self.leader = None;

        // Flush buffered metrics
        self.report_metrics();

        let err = match res {
            Ok(infallible) => match infallible {},
            Err(err) => err,
        };

        match err {
            Fatal::Stopped => { /* Normal quit */ }
            _ => {
                error!(error = display(&err), "quit Core::main on error");
            }
        }

        debug!("update the metrics for shutdown");
        {
            let mut curr = self.tx_metrics.borrow().clone();
            curr.running_state = Err(err.clone());

            let _ = self.tx_metrics.send(curr);
        }

        info!("Core shutdown complete");

        Err(err)
    }

    /// Report a metrics payload on the current state of the node.
    pub(crate) fn report_metrics(&mut self) {
        let m = Metrics {
            running_state: Ok(()),
            id: self.id.clone(),

            term: self.term,
            server_state: self.server_state(),

            heartbeat_received: self.heartbeat_received,
            election_in_progress: self.candidate.is_some(),
            election_generation: self.generation,
            votes_for_self: self.votes_for_self,
            votes: self.votes.votes().clone(),

            heartbeats_received: self.heartbeats_received,
            liveness_signals: self.liveness_signals,
        };

        // Avoid waking up watchers when nothing changed.
        if *self.tx_metrics.borrow() == m {
            return;
        }

        debug!("id={} report_metrics: {}", self.id, m);
        let res = self.tx_metrics.send(m);

        if let Err(err) = res {
            error!(error=%err, id=display(&self.id), "error reporting metrics");
        }
    }

    pub(crate) fn server_state(&self) -> ServerState {
        if self.leader.is_some() {
            ServerState::Leader
        } else if self.candidate.is_some() {
            ServerState::Candidate
        } else {
            ServerState::Follower
        }
    }

    /// Run an event handling loop
    ///
    /// It always returns a [`Fatal`] error upon returning.
    #[tracing::instrument(level = "debug", skip_all, fields(id=display(&self.id)))]
    async fn runtime_loop(&mut self) -> Result<Infallible, Fatal> {
        loop {
            self.report_metrics();

            debug!("id={} runtime_loop: wait for next event", self.id);

            futures::select_biased! {
                notify_res = self.rx_notification.recv().fuse() => {
                    match notify_res {
                        Some(notify) => self.handle_notification(notify)?,
                        None => {
                            tracing::error!("all rx_notify senders are dropped");
                            return Err(Fatal::Stopped);
                        }
                    };
                }

                msg_res = self.rx_api.recv().fuse() => {
                    match msg_res {
                        Some(msg) => self.handle_api_msg(msg)?,
                        None => {
                            tracing::info!("all rx_api senders are dropped");
                            return Err(Fatal::Stopped);
                        }
                    };
                }
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self, msg), fields(id=display(&self.id)))]
    pub(crate) fn handle_api_msg(
        &mut self,
        msg: APIMessage,
    ) -> Result<(), Fatal> {
        debug!("ELECT_event id={:<2}  input: {}", self.id, msg);

        match msg {
            APIMessage::Start { peers, tx } => {
                info!(
                    peers = debug(&peers),
                    election_timeout = debug(self.election_timeout),
                    "received APIMessage::Start: {}",
                    func_name!()
                );

                self.peers = peers;
                self.arm_heartbeat_check();
                let _ = tx.send(());
            }
            APIMessage::Heartbeat { tx } => {
                self.handle_heartbeat();
                let _ = tx.send(());
            }
            APIMessage::RequestVote { rpc, tx } => {
                info!(
                    vote_request = display(&rpc),
                    "received APIMessage::RequestVote: {}",
                    func_name!()
                );

                let granted = self.votes.grant(rpc.term, &rpc.candidate);
                let _ = tx.send(granted);
            }
            APIMessage::Elect => {
                if self.leader.is_some() {
                    info!("ExternalCommand: already a Leader");
                } else if let Some(c) = &self.candidate {
                    info!("ExternalCommand: already electing: {}", c);
                } else {
                    self.start_election();
                }
            }
            APIMessage::Shutdown => {
                info!("received APIMessage::Shutdown");
                return Err(Fatal::Stopped);
            }
        };

        Ok(())
    }

    pub(crate) fn handle_notification(
        &mut self,
        notify: Notification,
    ) -> Result<(), Fatal> {
        debug!("ELECT_event id={:<2} notify: {}", self.id, notify);

        match notify {
            Notification::WatchTimeout { round } => {
                self.check_heartbeat(round);
            }

            Notification::VotesCollected {
                generation,
                granted,
            } => {
                self.handle_votes_collected(generation, granted);
            }

            Notification::BackoffElapsed { generation } => {
                self.retry_election(generation);
            }

            Notification::Tick { i } => {
                debug!("received tick: {}", i);
                self.tick_heartbeat();
            }
        };

        Ok(())
    }

    /// Record an inbound heartbeat.
    ///
    /// Only the first heartbeat of a check interval is a liveness signal. A
    /// candidate receiving one gives up its election and follows.
    pub(crate) fn handle_heartbeat(&mut self) {
        self.heartbeats_received += 1;

        if self.heartbeat_received {
            debug!("id={} heartbeat already received in this interval", self.id);
            return;
        }

        self.heartbeat_received = true;
        self.liveness_signals += 1;

        if let Some(c) = &self.candidate {
            info!(
                "id={} candidate {} received a heartbeat, become follower",
                self.id, c
            );
            self.abandon_election();
        }
    }

    /// Schedule a new heartbeat check after the election timeout.
    ///
    /// Any previously scheduled check becomes stale.
    fn arm_heartbeat_check(&mut self) {
        self.watch_round += 1;
        let round = self.watch_round;

        debug!(
            "id={} check heartbeat in {:?}, round: {}",
            self.id, self.election_timeout, round
        );

        self.schedule(self.election_timeout, Notification::WatchTimeout {
            round,
        });
    }

    /// Check whether a heartbeat arrived during the last election timeout.
    fn check_heartbeat(&mut self, round: u64) {
        if round != self.watch_round {
            debug!(
                "id={} stale heartbeat check round {}, current: {}",
                self.id, round, self.watch_round
            );
            return;
        }

        if self.leader.is_some() {
            info!("id={} is leader, stop checking heartbeat", self.id);
            return;
        }

        if self.candidate.is_some() {
            info!(
                "id={} election in progress, stop checking heartbeat",
                self.id
            );
            return;
        }

        if self.heartbeat_received {
            debug!("id={} heartbeat received, leader is alive", self.id);
            self.heartbeat_received = false;
            self.arm_heartbeat_check();
            return;
        }

        if !self.runtime_config.enable_elect.load(Ordering::Relaxed) {
            debug!(
                "id={} no heartbeat in {:?}, election disabled",
                self.id, self.election_timeout
            );
            self.arm_heartbeat_check();
            return;
        }

        info!(
            "id={} no heartbeat in {:?}, start election",
            self.id, self.election_timeout
        );
        self.start_election();
    }

    /// Start a new election round for a new term.
    ///
    /// Returns `false` if a heartbeat arrived in the current interval, i.e.,
    /// another leader is likely alive.
    fn start_election(&mut self) -> bool {
        if self.heartbeat_received {
            info!(
                "id={} received a heartbeat, another leader is likely alive, skip election",
                self.id
            );
            return false;
        }

        self.term += 1;
        self.generation += 1;

        let self_granted = self.votes.grant(self.term, &self.id);
        if !self_granted {
            warn!(
                "id={} already voted for {:?} in term {}, can not vote for itself",
                self.id,
                self.votes.voted_for(self.term),
                self.term
            );
        }

        let candidate = Candidate::new(self.generation, self.term, self_granted);
        self.votes_for_self = candidate.granted();
        self.candidate = Some(candidate);

        self.broadcast_request_vote();
        true
    }

    /// Ask every peer for its vote in parallel.
    ///
    /// The result is sent back as a single [`Notification::VotesCollected`]
    /// once every request has settled. A request that fails or is not answered
    /// within the vote timeout counts as no vote.
    fn broadcast_request_vote(&mut self) {
        let generation = self.generation;
        let rpc = VoteRequest::new(self.term, self.id.clone());

        let peers = self.peers.clone();
        let network = self.network.clone();
        let id = self.id.clone();
        let ttl = self.config.vote_timeout();
        let tx = self.tx_notification.clone();

        let fu = async move {
            let calls = peers.iter().map(|target| {
                send_vote_request(&network, &id, target, &rpc, ttl)
            });

            let replies = join_all(calls).await;
            let granted = replies.into_iter().filter(|x| *x).count() as u64;

            let _ = tx.send(Notification::VotesCollected {
                generation,
                granted,
            });
        };

        let span = tracing::span!(parent: &self.span, Level::DEBUG, "collect_votes", generation);
        tokio::spawn(fu.instrument(span));
    }

    fn handle_votes_collected(&mut self, generation: u64, granted: u64) {
        let Some(candidate) = self.candidate.as_mut() else {
            debug!(
                "id={} no election in progress, ignore votes of generation {}",
                self.id, generation
            );
            return;
        };

        if candidate.generation != generation {
            debug!(
                "id={} ignore votes of stale generation {}, current: {}",
                self.id, generation, candidate.generation
            );
            return;
        }

        let tally = candidate.collect(granted);
        let term = candidate.term;
        self.votes_for_self = tally;

        info!(
            "id={} election of term {} finished: {} votes from {} nodes",
            self.id,
            term,
            tally,
            self.peers.len() + 1
        );

        let cluster_size = self.peers.len() as u64 + 1;
        if self.config.vote_quorum.is_granted(tally, cluster_size) {
            self.establish_leader();
            return;
        }

        let backoff = self.config.new_rand_backoff();
        info!(
            "id={} lost election of term {}, retry in {:?}",
            self.id, term, backoff
        );
        self.schedule(backoff, Notification::BackoffElapsed { generation });
    }

    fn retry_election(&mut self, generation: u64) {
        let current = self.candidate.as_ref().map(|c| c.generation);

        if current != Some(generation) {
            debug!(
                "id={} ignore stale backoff of generation {}, current: {:?}",
                self.id, generation, current
            );
            return;
        }

        if !self.start_election() {
            self.abandon_election();
        }
    }

    /// Give up the current election and go back to checking heartbeats.
    fn abandon_election(&mut self) {
        self.candidate = None;
        self.generation += 1;
        self.arm_heartbeat_check();
    }

    fn establish_leader(&mut self) {
        let Some(candidate) = self.candidate.take() else {
            return;
        };

        let tick =
            Tick::spawn(self.config.heartbeat_interval(), self.tx_notification.clone());

        let leader = Leader::new(candidate.term, candidate.granted(), tick);
        info!("id={} become leader: {}", self.id, leader);

        self.leader = Some(Box::new(leader));

        // The first heartbeat is sent at once, the following ones on ticks.
        self.tick_heartbeat();
    }

    fn tick_heartbeat(&mut self) {
        if !self.runtime_config.enable_heartbeat.load(Ordering::Relaxed) {
            debug!("id={} heartbeat is disabled", self.id);
            return;
        }

        let Some(leader) = self.leader.as_mut() else {
            return;
        };

        let mut lh = LeaderHandler {
            id: &self.id,
            config: &self.config,
            network: &self.network,
            peers: &self.peers,
            leader: &mut **leader,
        };
        lh.broadcast_heartbeat();
    }

    /// Send `notification` back to this core after `delay`.
    fn schedule(&self, delay: Duration, notification: Notification) {
        let tx = self.tx_notification.clone();

        let fu = async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(notification);
        };

        tokio::spawn(fu.instrument(Span::current()));
    }
}

/// Send a vote request to `target` and tell whether the vote is granted.
///
/// A peer without a handler for the request counts as no vote. The fault
/// belongs to the peer and does not stop this node.
async fn send_vote_request<Net>(
    network: &Net,
    id: &NodeId,
    target: &NodeId,
    rpc: &VoteRequest,
    ttl: Duration,
) -> bool
where
    Net: Network,
{
    let req = match Request::post(target, VOTE_PATH).with_json(rpc) {
        Ok(req) => req,
        Err(e) => {
            error!("id={} failed to encode {}: {}", id, rpc, e);
            return false;
        }
    };

    let res = tokio::time::timeout(ttl, network.send(id, req)).await;

    let resp = match res {
        Ok(Ok(resp)) => resp,
        Ok(Err(route_error)) => {
            error!(
                "id={} vote request to {} not routed: {}",
                id, target, route_error
            );
            return false;
        }
        Err(_elapsed) => {
            warn!("id={} vote request to {} timeout after {:?}", id, target, ttl);
            return false;
        }
    };

    let Some(reply) = resp.json::<VoteReply>() else {
        warn!("id={} no valid vote reply from {}: {}", id, target, resp);
        return false;
    };

    debug!("id={} vote reply from {}: {}", id, target, reply);
    reply.voted_for_you
}
