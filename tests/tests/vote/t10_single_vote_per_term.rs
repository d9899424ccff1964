use anyhow::Result;
use elector::rpc::Request;
use elector::rpc::VoteReply;
use elector::rpc::VoteRequest;
use elector::rpc::VOTE_PATH;
use elector::Network;
use maplit::btreemap;
use pretty_assertions::assert_eq;
use pseudonet::Cluster;

use crate::fixtures::manual_elect_config;
use crate::fixtures::nid;
use crate::fixtures::s;
use crate::fixtures::ut_harness;

/// A node grants at most one vote per term, to the first candidate asking.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn single_vote_per_term() -> Result<()> {
    let config = manual_elect_config()?;

    let cluster = Cluster::new(1, config)?;
    cluster.start_all().await?;

    let net = cluster.net();

    let vote = |term: u64, candidate: &str| {
        Request::post(nid(0), VOTE_PATH)
            .with_json(&VoteRequest::new(term, candidate))
    };

    tracing::info!("--- the first candidate of a term gets the vote");
    {
        let resp = net.send(&s("a"), vote(1, "a")?).await?;
        assert_eq!(Some(r#"{"votedForYou":true}"#.to_string()), resp.body);
    }

    tracing::info!("--- later candidates of the same term do not, the first neither");
    {
        let resp = net.send(&s("b"), vote(1, "b")?).await?;
        assert!(resp.ok);
        assert_eq!(Some(VoteReply { voted_for_you: false }), resp.json::<VoteReply>());

        let resp = net.send(&s("a"), vote(1, "a")?).await?;
        assert_eq!(Some(VoteReply { voted_for_you: false }), resp.json::<VoteReply>());
    }

    tracing::info!("--- terms are independent, in any order");
    {
        let resp = net.send(&s("b"), vote(3, "b")?).await?;
        assert_eq!(Some(VoteReply { voted_for_you: true }), resp.json::<VoteReply>());

        let resp = net.send(&s("c"), vote(2, "c")?).await?;
        assert_eq!(Some(VoteReply { voted_for_you: true }), resp.json::<VoteReply>());
    }

    let m = cluster.node(&nid(0)).unwrap().metrics().borrow().clone();
    assert_eq!(btreemap! {1=>s("a"), 2=>s("c"), 3=>s("b")}, m.votes);

    Ok(())
}

/// Concurrent vote requests of one term: exactly one is granted.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn concurrent_vote_requests() -> Result<()> {
    let config = manual_elect_config()?;

    let cluster = Cluster::new(1, config)?;
    cluster.start_all().await?;

    let net = cluster.net().clone();

    let calls = ["a", "b", "c", "d"].into_iter().map(|candidate| {
        let net = net.clone();
        async move {
            let req = Request::post(nid(0), VOTE_PATH)
                .with_json(&VoteRequest::new(7, candidate))?;
            let resp = net.send(&s(candidate), req).await?;
            Ok::<_, anyhow::Error>(resp.json::<VoteReply>())
        }
    });

    let replies = futures::future::try_join_all(calls).await?;
    let granted =
        replies.iter().filter(|r| **r == Some(VoteReply { voted_for_you: true }));
    assert_eq!(1, granted.count());

    Ok(())
}
