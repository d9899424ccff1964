use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use elector::Config;
use elector::ServerState;
use pretty_assertions::assert_eq;
use pseudonet::Cluster;

use crate::fixtures::nid;
use crate::fixtures::timeout;
use crate::fixtures::ut_harness;

/// Heartbeats carry no term: a leader never learns about a newer leader and
/// stays a leader.
///
/// - node-0 leads, then stops sending heartbeats.
/// - The followers time out and one of them wins a later term.
/// - node-0 is still a leader.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn leader_never_steps_down() -> Result<()> {
    let config = Arc::new(
        Config {
            enable_elect: false,
            ..Default::default()
        }
        .validate()?,
    );

    let cluster = Cluster::new(3, config)?;
    cluster.start_all().await?;

    let n0 = cluster.node(&nid(0)).unwrap();

    tracing::info!("--- node-0 becomes leader");
    {
        n0.elect().await?;
        n0.wait(timeout()).state(ServerState::Leader, "lead").await?;
    }

    tracing::info!("--- node-0 stops heartbeat, followers may elect");
    {
        n0.runtime_config().heartbeat(false);
        for i in 1..3 {
            cluster.node(&nid(i)).unwrap().runtime_config().elect(true);
        }
    }

    let mut new_leaders = vec![];
    let deadline = tokio::time::Instant::now() + Duration::from_millis(30_000);
    while new_leaders.is_empty() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
        new_leaders = cluster
            .leaders()
            .into_iter()
            .filter(|id| id != &nid(0))
            .collect::<Vec<_>>();
    }

    assert_eq!(1, new_leaders.len(), "a follower took over");
    assert_eq!(
        ServerState::Leader,
        n0.metrics().borrow().server_state,
        "the old leader does not step down"
    );

    Ok(())
}
