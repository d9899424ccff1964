use std::time::Duration;

use anyhow::Result;
use elector::ServerState;
use pretty_assertions::assert_eq;
use pseudonet::Cluster;
use tokio::time::Instant;

use crate::fixtures::manual_elect_config;
use crate::fixtures::nid;
use crate::fixtures::s;
use crate::fixtures::timeout;
use crate::fixtures::ut_harness;
use crate::fixtures::wait_for_single_leader;

/// A peer that is not on the network does not block an election.
///
/// Its vote request is answered at once with 503 and counts as no vote.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn unregistered_peer_does_not_block() -> Result<()> {
    let config = manual_elect_config()?;

    let cluster = Cluster::new(3, config.clone())?;
    cluster.start_all().await?;

    cluster.net().unregister(&nid(2));

    let n0 = cluster.node(&nid(0)).unwrap();

    let now = Instant::now();
    n0.elect().await?;

    let m = n0.wait(timeout()).state(ServerState::Leader, "lead").await?;
    assert!(now.elapsed() < config.vote_timeout());

    assert_eq!(1, m.term);
    assert_eq!(2, m.votes_for_self);

    let m1 = cluster.node(&nid(1)).unwrap().metrics().borrow().clone();
    assert_eq!(Some(&nid(0)), m1.votes.get(&1));

    Ok(())
}

/// A peer that never answers in time delays the election by the vote timeout
/// at most, then counts as no vote.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn slow_peer_times_out() -> Result<()> {
    let config = manual_elect_config()?;

    let cluster = Cluster::new(3, config.clone())?;
    cluster.start_all().await?;

    cluster.net().set_delay(&nid(2), Some(Duration::from_millis(1_000)));

    let n0 = cluster.node(&nid(0)).unwrap();

    let now = Instant::now();
    n0.elect().await?;

    let m = n0.wait(timeout()).state(ServerState::Leader, "lead").await?;
    let elapsed = now.elapsed();

    assert!(elapsed >= config.vote_timeout(), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(1_000), "{:?}", elapsed);
    assert_eq!(2, m.votes_for_self);

    Ok(())
}

/// A peer that is on the network but not started yet has no handlers.
///
/// Its missing route counts as no vote: the candidate keeps running and
/// retrying, and wins once the peers start.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn unstarted_peer_does_not_stop_candidate() -> Result<()> {
    let config = manual_elect_config()?;

    let cluster = Cluster::new(3, config)?;

    let n0 = cluster.node(&nid(0)).unwrap();
    n0.start(vec![nid(1), nid(2)]).await?;
    n0.elect().await?;

    tracing::info!("--- node-0 retries while its peers have no handlers");
    {
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        let m = n0.metrics().borrow().clone();
        assert_eq!(Ok(()), m.running_state);
        assert!(n0.is_running());
        assert_eq!(ServerState::Candidate, m.server_state);
        assert!(m.term >= 2, "term: {}", m.term);
        assert_eq!(1, m.votes_for_self);
    }

    tracing::info!("--- start the peers, node-0 wins a later round");
    {
        for i in 1..3 {
            let peers = cluster.ids().into_iter().filter(|id| *id != nid(i));
            cluster.node(&nid(i)).unwrap().start(peers).await?;
        }

        let leader =
            wait_for_single_leader(&cluster, timeout().unwrap()).await?;
        assert_eq!(s("node-0"), leader);

        let m = n0.metrics().borrow().clone();
        assert_eq!(Ok(()), m.running_state);
    }

    cluster.shutdown().await?;
    Ok(())
}
