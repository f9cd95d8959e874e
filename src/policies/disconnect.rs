//! # Peer disconnects on serialized mediums.
//!
//! On a serialized medium (Bluetooth-like) a connection left open by one action
//! makes the next action fail with "already connected". After each unit the
//! serial lane consults [`requires_disconnect`] and, when it says so, awaits
//! [`PeerDisconnector::disconnect`] before dequeuing the next unit.
//!
//! ## Trigger table
//! ```text
//! action type   │ settled result                               │ disconnect
//! ──────────────┼──────────────────────────────────────────────┼───────────
//! Replication   │ anything                                     │ yes
//! Notification  │ Ok(Beacons(RetrievedAndParsed{matched:true}))│ no
//! Notification  │ any other Ok                                 │ yes
//! Notification  │ Err                                          │ yes
//! Other         │ Err                                          │ yes
//! Other         │ Ok                                           │ no
//! ```
//!
//! A matched beacon means a replication against the same peer is about to be
//! enqueued, so the link is kept for it.

use async_trait::async_trait;

use crate::actions::{ActionOutcome, ActionType, BeaconResolution};
use crate::error::{ActionError, DisconnectError};

/// Tears down the transport-level connection to a peer.
#[async_trait]
pub trait PeerDisconnector: Send + Sync + 'static {
    /// Disconnects from `peer`. Resolves once the link is down.
    async fn disconnect(&self, peer: &str) -> Result<(), DisconnectError>;
}

/// Disconnector for mediums that need no explicit teardown.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDisconnector;

#[async_trait]
impl PeerDisconnector for NoopDisconnector {
    async fn disconnect(&self, _peer: &str) -> Result<(), DisconnectError> {
        Ok(())
    }
}

/// Decides whether the serial lane must disconnect from the peer after an
/// action of type `ty` settled with `res`.
pub fn requires_disconnect(ty: ActionType, res: &Result<ActionOutcome, ActionError>) -> bool {
    match (ty, res) {
        (ActionType::Replication, _) => true,
        (
            ActionType::Notification,
            Ok(ActionOutcome::Beacons(BeaconResolution::RetrievedAndParsed { matched: true })),
        ) => false,
        (ActionType::Notification, _) => true,
        (ActionType::Other(_), Err(_)) => true,
        (ActionType::Other(_), Ok(_)) => false,
    }
}
