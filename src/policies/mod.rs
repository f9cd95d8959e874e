//! Admission policies.
//!
//! This module groups the knobs that decide **whether** and **when** an
//! enqueued action runs.
//!
//! ## Contents
//! - `AdmissionPolicy` the contract the pool drives (open / close / admit)
//! - `ParallelPolicy` start immediately, cap replications per peer
//! - `SerialPolicy` one action at a time through a FIFO lane
//! - [`ReplicationCounter`] per-peer replication bookkeeping
//! - [`PeerDisconnector`], [`requires_disconnect`] serialized-medium link teardown
//!
//! ## Quick wiring
//! ```text
//! PoolConfig.medium
//!   ├─ Wifi / LocalWireless ─► ParallelPolicy ─► ReplicationCounter
//!   └─ Bluetooth ────────────► SerialPolicy  ─► PeerDisconnector
//! ```

mod admission;
mod counter;
mod disconnect;
mod parallel;
mod serial;

pub(crate) use admission::{AdmissionPolicy, PolicyContext, Rejection};
pub use counter::{MAX_REPLICATIONS_PER_PEER, ReplicationCounter, ReplicationPermit};
pub use disconnect::{NoopDisconnector, PeerDisconnector, requires_disconnect};
pub(crate) use parallel::ParallelPolicy;
pub(crate) use serial::SerialPolicy;
