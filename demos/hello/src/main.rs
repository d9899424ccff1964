mod logging;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use elector::Config;
use elector::ServerState;
use pseudonet::Cluster;

use crate::logging::init_logging;

/// Run a cluster of nodes on a simulated network and print who leads.
#[derive(Debug, Parser)]
#[clap(name = "hello", version)]
struct Args {
    /// Number of nodes in the cluster
    #[clap(long, default_value = "3")]
    nodes: usize,

    /// How long in milliseconds the cluster runs before the report
    #[clap(long, default_value = "3000")]
    run_ms: u64,

    /// Write logs to rotated files in this directory instead of stderr
    #[clap(long)]
    log_dir: Option<String>,

    /// Log level, `RUST_LOG` overrides it
    #[clap(long, default_value = "INFO")]
    log_level: String,

    #[clap(flatten)]
    config: Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let _g = init_logging("elector", args.log_dir.as_deref(), &args.log_level)?;

    let config = Arc::new(args.config.validate()?);

    println!(
        "starting {} nodes, election timeout {}..{}ms, heartbeat every {}ms, quorum: {:?}",
        args.nodes,
        config.election_timeout_min,
        config.election_timeout_max,
        config.heartbeat_interval,
        config.vote_quorum,
    );

    let cluster = Cluster::new(args.nodes, config)?;
    cluster.start_all().await?;

    tokio::time::sleep(Duration::from_millis(args.run_ms)).await;

    println!("after {}ms:", args.run_ms);
    for node in cluster.nodes() {
        let m = node.metrics().borrow().clone();
        let mark = if m.server_state == ServerState::Leader {
            " *"
        } else {
            ""
        };

        println!(
            "  {:<8} {:<10} term: {:<3} votes for self: {:<3} heartbeats: {}{}",
            m.id,
            m.server_state.to_string(),
            m.term,
            m.votes_for_self,
            m.heartbeats_received,
            mark
        );
    }

    let leaders = cluster.leaders();
    match leaders.len() {
        0 => println!("no leader"),
        1 => println!("leader: {}", leaders[0]),
        _ => println!("more than one leader: {:?}", leaders),
    }

    cluster.shutdown().await?;

    Ok(())
}
