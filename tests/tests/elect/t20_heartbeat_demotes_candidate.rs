use std::time::Duration;

use anyhow::Result;
use elector::rpc::Request;
use elector::rpc::HEARTBEAT_PATH;
use elector::Network;
use elector::ServerState;
use pretty_assertions::assert_eq;
use pseudonet::Cluster;

use crate::fixtures::manual_elect_config;
use crate::fixtures::nid;
use crate::fixtures::timeout;
use crate::fixtures::ut_harness;

/// A candidate that receives a heartbeat becomes a follower and drops its
/// election.
///
/// - node-1 answers slowly, node-0 is a candidate waiting for its vote.
/// - A heartbeat reaches node-0 meanwhile.
/// - node-0 becomes follower, the late result of its round is ignored and no
///   retry happens.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn heartbeat_demotes_candidate() -> Result<()> {
    let config = manual_elect_config()?;

    let cluster = Cluster::new(2, config)?;
    cluster.start_all().await?;

    let n0 = cluster.node(&nid(0)).unwrap();

    cluster.net().set_delay(&nid(1), Some(Duration::from_millis(200)));

    tracing::info!("--- node-0 campaigns, vote request to node-1 is slow");
    {
        n0.elect().await?;
        let m = n0.wait(timeout()).state(ServerState::Candidate, "campaign").await?;
        assert_eq!(1, m.term);
        assert_eq!(true, m.election_in_progress);
    }

    tracing::info!("--- a heartbeat arrives at node-0");
    {
        let resp = cluster
            .net()
            .send(&nid(1), Request::get(nid(0), HEARTBEAT_PATH))
            .await?;
        assert!(resp.ok);

        let m = n0.wait(timeout()).state(ServerState::Follower, "demoted").await?;
        assert_eq!(false, m.election_in_progress);
        assert_eq!(1, m.liveness_signals);
    }

    tracing::info!("--- the abandoned round neither wins nor retries");
    {
        tokio::time::sleep(Duration::from_millis(2_000)).await;

        let m = n0.metrics().borrow().clone();
        assert_eq!(ServerState::Follower, m.server_state);
        assert_eq!(1, m.term);
        assert_eq!(false, m.election_in_progress);
    }

    Ok(())
}
