use std::time::Duration;

use anyhow::Result;
use elector::rpc::Request;
use elector::rpc::StatusCode;
use elector::rpc::HEARTBEAT_PATH;
use elector::rpc::VOTE_PATH;
use elector::Network;
use pretty_assertions::assert_eq;
use pseudonet::Cluster;
use tokio::time::Instant;

use crate::fixtures::manual_elect_config;
use crate::fixtures::nid;
use crate::fixtures::ut_harness;

/// An address without a node is answered at once with 503.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn unregistered_address() -> Result<()> {
    let config = manual_elect_config()?;

    let cluster = Cluster::new(2, config)?;
    cluster.start_all().await?;

    let net = cluster.net();

    for req in [
        Request::get("nowhere", HEARTBEAT_PATH),
        Request::post("nowhere", VOTE_PATH).with_body("{}"),
    ] {
        let now = Instant::now();
        let resp = net.send(&nid(0), req).await?;

        assert_eq!(false, resp.ok);
        assert_eq!(StatusCode::ServiceUnavailable, resp.status);
        assert_eq!(503, resp.status.as_u16());
        assert_eq!(Duration::ZERO, now.elapsed());
    }

    tracing::info!("--- a node removed from the network is unreachable too");
    {
        assert!(net.is_registered(&nid(1)));
        net.unregister(&nid(1));

        let resp = net.send(&nid(0), Request::get(nid(1), HEARTBEAT_PATH)).await?;
        assert_eq!(StatusCode::ServiceUnavailable, resp.status);

        let m = cluster.node(&nid(1)).unwrap().metrics().borrow().clone();
        assert_eq!(0, m.heartbeats_received);
    }

    Ok(())
}

/// A round trip costs twice the network delay plus the processing and handler
/// delays of the target.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn round_trip_latency() -> Result<()> {
    let config = manual_elect_config()?;
    let want = Duration::from_millis(config.round_trip());

    let cluster = Cluster::new(2, config)?;
    cluster.start_all().await?;

    let now = Instant::now();
    let resp = cluster
        .net()
        .send(&nid(0), Request::get(nid(1), HEARTBEAT_PATH))
        .await?;

    assert!(resp.ok);
    assert_eq!(want, now.elapsed());

    Ok(())
}
