//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `PeerActionPool`, `ReplicationCounter`, `SerialLane`,
//!   `runner::run_once`, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the pool's subscriber listener (fans out to `SubscriberSet`)
//!   and any receiver obtained through [`PeerActionPool::subscribe`](crate::PeerActionPool::subscribe).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
