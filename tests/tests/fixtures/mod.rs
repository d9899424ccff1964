#![allow(dead_code)]

use std::future::Future;
use std::sync::Arc;
use std::sync::Once;
use std::time::Duration;

use elector::Config;
use elector::NodeId;
use pseudonet::Cluster;
use tracing_subscriber::EnvFilter;

/// Run an async test on a current-thread runtime with a paused clock.
///
/// Timers fire as soon as every task is idle, so a test that waits for
/// seconds of simulated time finishes at once and runs the same way every
/// time, given the same random timeouts.
pub fn ut_harness<F, Fut>(f: F) -> anyhow::Result<()>
where
    F: FnOnce() -> Fut + 'static,
    Fut: Future<Output = anyhow::Result<()>> + 'static,
{
    init_ut_tracing();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()?;

    let res = rt.block_on(f());
    if let Err(e) = &res {
        tracing::error!("test failure: {:?}", e);
    }
    res
}

pub fn init_ut_tracing() {
    static START: Once = Once::new();

    START.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_ansi(false)
            .try_init();
    });
}

/// Convert anything to a node id.
pub fn s(x: impl ToString) -> NodeId {
    x.to_string()
}

/// The node id a [`Cluster`] gives to its `i`-th node.
pub fn nid(i: usize) -> NodeId {
    format!("node-{}", i)
}

/// Simulated time a test may wait for a condition.
pub fn timeout() -> Option<Duration> {
    Some(Duration::from_millis(10_000))
}

/// Default config in which nodes only campaign when asked to.
pub fn manual_elect_config() -> anyhow::Result<Arc<Config>> {
    let config = Config {
        enable_elect: false,
        ..Default::default()
    }
    .validate()?;
    Ok(Arc::new(config))
}

/// Poll until exactly one node of `cluster` is a leader.
pub async fn wait_for_single_leader(
    cluster: &Cluster,
    timeout: Duration,
) -> anyhow::Result<NodeId> {
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        let leaders = cluster.leaders();
        if leaders.len() == 1 {
            return Ok(leaders[0].clone());
        }

        if tokio::time::Instant::now() >= deadline {
            anyhow::bail!(
                "no single leader within {:?}, leaders: {:?}",
                timeout,
                leaders
            );
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
