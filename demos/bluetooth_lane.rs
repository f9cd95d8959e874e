//! # Bluetooth lane example
//!
//! Shows the serial admission policy: one action on the medium at a time,
//! in submission order, with a peer disconnect between units when the
//! finished unit requires it.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example bluetooth_lane --features "logging"
//! ```

#[cfg(not(feature = "logging"))]
compile_error!("error");

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use peerpool::{
    ActionError, ActionOutcome, ActionType, BeaconResolution, ConnectionAgent, DisconnectError,
    LogWriter, Medium, PeerAction, PeerActionPool, PeerDisconnector, PoolConfig, Subscribe,
};
use tracing_subscriber::EnvFilter;

struct DemoAction {
    id: &'static str,
    peer: &'static str,
    ty: ActionType,
    outcome: ActionOutcome,
}

#[async_trait]
impl PeerAction for DemoAction {
    fn id(&self) -> &str {
        self.id
    }

    fn peer_identifier(&self) -> &str {
        self.peer
    }

    fn action_type(&self) -> ActionType {
        self.ty
    }

    fn psk_identity(&self) -> &str {
        self.peer
    }

    fn psk_key(&self) -> &[u8] {
        b"demo-shared-secret"
    }

    async fn start(&self, _agent: ConnectionAgent) -> Result<ActionOutcome, ActionError> {
        println!("{:>6}[{}] started ({})", "", self.id, self.ty);
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(self.outcome)
    }

    fn kill(&self) {
        println!("{:>6}[{}] killed", "", self.id);
    }
}

struct PrintDisconnector;

#[async_trait]
impl PeerDisconnector for PrintDisconnector {
    async fn disconnect(&self, peer: &str) -> Result<(), DisconnectError> {
        println!("{:>6}disconnecting {peer}", "");
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let pool = PeerActionPool::builder(PoolConfig::for_medium(Medium::Bluetooth))
        .with_subscribers(vec![Arc::new(LogWriter::new()) as Arc<dyn Subscribe>])
        .with_disconnector(Arc::new(PrintDisconnector))
        .build();
    pool.start()?;

    let units = [
        DemoAction {
            id: "replicate-p1",
            peer: "p1",
            ty: ActionType::Replication,
            outcome: ActionOutcome::Completed,
        },
        DemoAction {
            id: "beacons-p2",
            peer: "p2",
            ty: ActionType::Notification,
            outcome: ActionOutcome::Beacons(BeaconResolution::RetrievedAndParsed { matched: true }),
        },
        DemoAction {
            id: "beacons-p3",
            peer: "p3",
            ty: ActionType::Notification,
            outcome: ActionOutcome::Beacons(BeaconResolution::NetworkProblem),
        },
    ];
    for unit in units {
        pool.enqueue(Arc::new(unit))?;
    }

    tokio::time::sleep(Duration::from_millis(600)).await;
    pool.stop();
    Ok(())
}
