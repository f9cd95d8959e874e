//! # WiFi pool example
//!
//! Shows the parallel admission policy:
//! - every action starts immediately
//! - a peer never has more than two replications in flight
//! - a slot frees as soon as a replication settles and is killed
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example wifi_pool --features "logging"
//! ```

#[cfg(not(feature = "logging"))]
compile_error!("error");

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use peerpool::{
    ActionError, ActionOutcome, ActionType, ConnectionAgent, LogWriter, Medium, PeerAction,
    PeerActionPool, PoolConfig, Subscribe,
};
use tracing_subscriber::EnvFilter;

struct Replicate {
    id: String,
    peer: String,
    took: Duration,
}

impl Replicate {
    fn arc(id: &str, peer: &str, took_ms: u64) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_owned(),
            peer: peer.to_owned(),
            took: Duration::from_millis(took_ms),
        })
    }
}

#[async_trait]
impl PeerAction for Replicate {
    fn id(&self) -> &str {
        &self.id
    }

    fn peer_identifier(&self) -> &str {
        &self.peer
    }

    fn action_type(&self) -> ActionType {
        ActionType::Replication
    }

    fn psk_identity(&self) -> &str {
        &self.peer
    }

    fn psk_key(&self) -> &[u8] {
        b"demo-shared-secret"
    }

    async fn start(&self, agent: ConnectionAgent) -> Result<ActionOutcome, ActionError> {
        println!(
            "{:>6}[{}] replicating with {} (keep-alive {:?})",
            "",
            self.id,
            agent.credential().identity(),
            agent.options().keep_alive_interval,
        );
        tokio::time::sleep(self.took).await;
        Ok(ActionOutcome::Completed)
    }

    fn kill(&self) {
        println!("{:>6}[{}] killed", "", self.id);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let pool = PeerActionPool::builder(PoolConfig::for_medium(Medium::Wifi))
        .with_subscribers(vec![Arc::new(LogWriter::new()) as Arc<dyn Subscribe>])
        .build();
    pool.start()?;

    // ============================================================
    // Demo -> third replication for the same peer is rejected
    // ============================================================
    println!("Demo 1: per-peer replication cap");
    pool.enqueue(Replicate::arc("a1", "p1", 200))?;
    pool.enqueue(Replicate::arc("a2", "p1", 400))?;
    pool.enqueue(Replicate::arc("a3", "p1", 100))?;
    println!("{:>6}p1 in flight: {}", "", pool.replication_count("p1"));

    // ============================================================
    // Demo -> slot frees when a replication settles
    // ============================================================
    println!("Demo 2: slot reuse");
    tokio::time::sleep(Duration::from_millis(250)).await;
    println!("{:>6}p1 in flight after a1: {}", "", pool.replication_count("p1"));
    pool.enqueue(Replicate::arc("a4", "p1", 100))?;
    println!("{:>6}p1 in flight after a4: {}", "", pool.replication_count("p1"));

    tokio::time::sleep(Duration::from_millis(400)).await;
    pool.stop();
    Ok(())
}
