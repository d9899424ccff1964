use anyhow::Result;
use elector::rpc::Request;
use elector::rpc::StatusCode;
use elector::rpc::VoteReply;
use elector::rpc::VoteRequest;
use elector::rpc::VOTE_PATH;
use elector::Network;
use pretty_assertions::assert_eq;
use pseudonet::Cluster;

use crate::fixtures::manual_elect_config;
use crate::fixtures::nid;
use crate::fixtures::s;
use crate::fixtures::ut_harness;

/// A vote request without a valid body is rejected with 400 and changes
/// nothing.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn bad_vote_request() -> Result<()> {
    let config = manual_elect_config()?;

    let cluster = Cluster::new(1, config)?;
    cluster.start_all().await?;

    let net = cluster.net();
    let n0 = cluster.node(&nid(0)).unwrap();

    tracing::info!("--- no body");
    {
        let resp = net.send(&s("a"), Request::post(nid(0), VOTE_PATH)).await?;
        assert_eq!(false, resp.ok);
        assert_eq!(StatusCode::BadRequest, resp.status);
        assert_eq!(None, resp.json::<VoteReply>());
    }

    tracing::info!("--- malformed bodies");
    for body in ["", "not json", r#"{"term":1}"#, r#"{"term":"x","candidate":"a"}"#]
    {
        let req = Request::post(nid(0), VOTE_PATH).with_body(body);
        let resp = net.send(&s("a"), req).await?;
        assert_eq!(StatusCode::BadRequest, resp.status, "body: {}", body);
    }

    assert!(n0.metrics().borrow().votes.is_empty());

    tracing::info!("--- a valid request still gets the vote");
    {
        let req = Request::post(nid(0), VOTE_PATH)
            .with_json(&VoteRequest::new(1, "a"))?;
        let resp = net.send(&s("a"), req).await?;
        assert_eq!(StatusCode::Ok, resp.status);
        assert_eq!(Some(VoteReply { voted_for_you: true }), resp.json::<VoteReply>());
    }

    Ok(())
}
