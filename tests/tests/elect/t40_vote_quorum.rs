use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use elector::Config;
use elector::ServerState;
use elector::VoteQuorum;
use pretty_assertions::assert_eq;
use pseudonet::Cluster;

use crate::fixtures::nid;
use crate::fixtures::timeout;
use crate::fixtures::ut_harness;

fn five_nodes_two_reachable(vote_quorum: VoteQuorum) -> Result<Cluster> {
    let config = Config {
        enable_elect: false,
        vote_quorum,
        ..Default::default()
    }
    .validate()?;

    let cluster = Cluster::new(5, Arc::new(config))?;

    for i in 2..5 {
        cluster.net().unregister(&nid(i));
    }

    Ok(cluster)
}

/// With `self-plus-one`, one vote besides its own makes a leader, whatever
/// the cluster size.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn self_plus_one_wins_with_two_votes() -> Result<()> {
    let cluster = five_nodes_two_reachable(VoteQuorum::SelfPlusOne)?;
    cluster.start_all().await?;

    let n0 = cluster.node(&nid(0)).unwrap();
    n0.elect().await?;

    let m = n0.wait(timeout()).state(ServerState::Leader, "lead").await?;
    assert_eq!(2, m.votes_for_self);

    Ok(())
}

/// With `cluster-majority`, 2 votes out of 5 nodes are not enough: the
/// candidate keeps retrying with higher terms.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn cluster_majority_needs_majority() -> Result<()> {
    let cluster = five_nodes_two_reachable(VoteQuorum::ClusterMajority)?;
    cluster.start_all().await?;

    let n0 = cluster.node(&nid(0)).unwrap();
    n0.elect().await?;

    let m = n0.wait(timeout()).term_at_least(3, "retry").await?;
    assert_eq!(ServerState::Candidate, m.server_state);

    tracing::info!("--- bring back node-2, the next retry wins");
    {
        let n2 = cluster.node(&nid(2)).unwrap();
        cluster.net().register(n2.dispatcher());

        let m = n0.wait(timeout()).state(ServerState::Leader, "lead").await?;
        assert_eq!(3, m.votes_for_self);
    }

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(vec![nid(0)], cluster.leaders());

    Ok(())
}
