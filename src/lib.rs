//! # peerpool
//!
//! **peerpool** is an admission pool for peer actions in a peer-to-peer
//! replication layer running over heterogeneous network mediums (local WiFi,
//! local ad-hoc wireless, Bluetooth).
//!
//! Peer discovery produces *actions* (replicate with a peer, fetch its
//! notification beacons). The pool decides how many may run at once for the
//! current medium, caps duplicate replication work against the same peer, and
//! guarantees that every action it admits is killed exactly once after its
//! start settles. `enqueue` never blocks.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  PeerAction  │   │  PeerAction  │   │  PeerAction  │
//!     │ (replicate)  │   │ (beacons)    │   │ (replicate)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ enqueue          ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  PeerActionPool                                                   │
//! │  - running flag (Stopped / Running)                               │
//! │  - Bus (broadcast events)                                         │
//! │  - AdmissionPolicy selected from Medium                           │
//! └──────┬─────────────────────────────────────────────┬──────────────┘
//!        ▼ Wifi / LocalWireless                        ▼ Bluetooth
//! ┌──────────────────────────────┐        ┌──────────────────────────────┐
//! │ ParallelPolicy               │        │ SerialPolicy                 │
//! │ - ReplicationCounter (2/peer)│        │ - FIFO lane, one at a time   │
//! │ - spawn run_once per action  │        │ - PeerDisconnector triggers  │
//! └──────┬───────────────────────┘        └──────┬───────────────────────┘
//!        └──────────────────┬────────────────────┘
//!                           ▼
//!             run_once: AgentFactory → start(agent) → kill()
//! ```
//!
//! ### Lifecycle
//! ```text
//! enqueue(action)
//!   ├─ pool stopped ─► Err(AlreadyStopped)
//!   └─ pool running ─► policy.admit(action)
//!         ├─ rejected (replication cap) ─► kill(), never started
//!         └─ admitted
//!               ├─► agent = AgentFactory::create_agent(psk_identity, psk_key)
//!               ├─► start(agent).await       (Ok / Err / panic)
//!               ├─► kill()                   (exactly once)
//!               └─► serial lane only: disconnect peer if the trigger table says so
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                          |
//! |-------------------|-------------------------------------------------------------|---------------------------------------------|
//! | **Pool**          | Start/stop/enqueue, policy routing, cleanup guarantee.      | [`PeerActionPool`], [`PoolBuilder`]         |
//! | **Actions**       | Contract implemented by replication/notification actions.   | [`PeerAction`], [`ActionOutcome`]           |
//! | **Policies**      | Per-peer replication caps, serial lane disconnect triggers.  | [`ReplicationCounter`], [`PeerDisconnector`]|
//! | **Agents**        | PSK-TLS connection agent options per action.                | [`AgentFactory`], [`ConnectionAgent`]       |
//! | **Subscriber API**| Hook into pool events (logging, metrics).                   | [`Subscribe`], [`Event`]                    |
//! | **Errors**        | Typed errors for the pool, actions and disconnects.         | [`PoolError`], [`ActionError`]              |
//! | **Configuration** | Medium selection, agent pooling, bus capacity.              | [`PoolConfig`], [`AgentConfig`]             |
//!
//! ## Optional features
//! - `logging`: exports the built-in [`LogWriter`] subscriber (renders events via `tracing`).
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use peerpool::{
//!     ActionError, ActionOutcome, ActionType, ConnectionAgent, Medium, PeerAction,
//!     PeerActionPool, PoolConfig,
//! };
//!
//! struct Replicate { id: String, peer: String }
//!
//! #[async_trait]
//! impl PeerAction for Replicate {
//!     fn id(&self) -> &str { &self.id }
//!     fn peer_identifier(&self) -> &str { &self.peer }
//!     fn action_type(&self) -> ActionType { ActionType::Replication }
//!     fn psk_identity(&self) -> &str { &self.peer }
//!     fn psk_key(&self) -> &[u8] { b"shared-secret" }
//!
//!     async fn start(&self, _agent: ConnectionAgent) -> Result<ActionOutcome, ActionError> {
//!         Ok(ActionOutcome::Completed)
//!     }
//!
//!     fn kill(&self) {}
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = PeerActionPool::builder(PoolConfig::for_medium(Medium::Wifi)).build();
//!     pool.start()?;
//!
//!     pool.enqueue(Arc::new(Replicate { id: "r1".into(), peer: "p1".into() }))?;
//!     assert_eq!(pool.replication_count("p1"), 1);
//!
//!     pool.stop();
//!     assert_eq!(pool.replication_count("p1"), 0);
//!     Ok(())
//! }
//! ```
mod actions;
mod agent;
mod core;
mod error;
mod events;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use actions::{ActionOutcome, ActionRef, ActionType, BeaconResolution, PeerAction};
pub use agent::{
    AgentConfig, AgentFactory, AgentOptions, ConnectionAgent, PskCredential, SUPPORTED_PSK_CIPHERS,
};
pub use crate::core::{Medium, PeerActionPool, PoolBuilder, PoolConfig};
pub use error::{ActionError, DisconnectError, PoolError};
pub use events::{Bus, Event, EventKind};
pub use policies::{
    MAX_REPLICATIONS_PER_PEER, NoopDisconnector, PeerDisconnector, ReplicationCounter,
    ReplicationPermit, requires_disconnect,
};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose the built-in tracing logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
