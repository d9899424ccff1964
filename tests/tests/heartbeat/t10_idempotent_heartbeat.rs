use std::time::Duration;

use anyhow::Result;
use elector::rpc::Request;
use elector::rpc::StatusCode;
use elector::rpc::HEARTBEAT_PATH;
use elector::Network;
use elector::ServerState;
use pretty_assertions::assert_eq;
use pseudonet::Cluster;

use crate::fixtures::manual_elect_config;
use crate::fixtures::nid;
use crate::fixtures::s;
use crate::fixtures::ut_harness;

/// Heartbeats within one check interval are a single liveness signal.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn idempotent_heartbeat() -> Result<()> {
    let config = manual_elect_config()?;

    let cluster = Cluster::new(1, config)?;
    cluster.start_all().await?;

    let net = cluster.net();
    let n0 = cluster.node(&nid(0)).unwrap();

    for _ in 0..2 {
        let resp =
            net.send(&s("leader"), Request::get(nid(0), HEARTBEAT_PATH)).await?;
        assert_eq!(StatusCode::Ok, resp.status);
        assert_eq!(None, resp.body);
    }

    let m = n0.metrics().borrow().clone();
    assert_eq!(2, m.heartbeats_received);
    assert_eq!(1, m.liveness_signals);
    assert_eq!(true, m.heartbeat_received);
    assert_eq!(ServerState::Follower, m.server_state);

    tracing::info!("--- the flag is cleared by the next check");
    {
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(false, n0.metrics().borrow().heartbeat_received);
    }

    Ok(())
}

/// A heartbeat sent with the wrong method reaches no handler.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn heartbeat_only_via_get() -> Result<()> {
    let config = manual_elect_config()?;

    let cluster = Cluster::new(1, config)?;
    cluster.start_all().await?;

    let net = cluster.net();

    let res = net.send(&s("leader"), Request::post(nid(0), HEARTBEAT_PATH)).await;
    let err = res.unwrap_err();
    assert_eq!(nid(0), err.address);
    assert_eq!(HEARTBEAT_PATH, err.path);

    let m = cluster.node(&nid(0)).unwrap().metrics().borrow().clone();
    assert_eq!(0, m.heartbeats_received);
    assert_eq!(0, m.term);

    Ok(())
}
