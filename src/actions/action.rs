//! # Peer action abstraction.
//!
//! This module defines the [`PeerAction`] trait (async, killable) and the
//! settled-result shapes the pool is allowed to inspect.
//! The common handle type is [`ActionRef`], an `Arc<dyn PeerAction>` shared
//! between the caller (who owns the action) and the pool (which holds it only
//! while it executes).
//!
//! ## Lifecycle
//! ```text
//! created by caller ──► enqueue ──► start(agent) at most once ──► kill() exactly once
//!                                └─► rejected ─────────────────► kill() exactly once
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::agent::ConnectionAgent;
use crate::error::ActionError;

/// Shared handle to a peer action.
pub type ActionRef = Arc<dyn PeerAction>;

/// Kind of work an action performs against its peer.
///
/// The pool only distinguishes replication (capped per peer, always followed by
/// a disconnect on serialized mediums) from notification (whose beacon result
/// decides the disconnect). Anything else is [`ActionType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// Replicate the local database with the peer.
    Replication,
    /// Fetch and parse the peer's notification beacons.
    Notification,
    /// Any other action kind.
    Other(&'static str),
}

impl ActionType {
    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ActionType::Replication => "replication",
            ActionType::Notification => "notification",
            ActionType::Other(name) => name,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// How a notification action resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeaconResolution {
    /// Beacons were fetched and parsed. `matched` is true when one of them is
    /// addressed to the local peer, meaning a replication against this peer is
    /// expected next.
    RetrievedAndParsed {
        /// A beacon addressed to us was found.
        matched: bool,
    },
    /// Beacons were fetched but could not be parsed.
    RetrievedButBad,
    /// The peer answered with a non-success HTTP response.
    HttpBadResponse,
    /// The request never completed at the network level.
    NetworkProblem,
    /// The action was killed while fetching.
    Killed,
}

/// Settled result of a successful `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action finished; nothing for the pool to interpret.
    Completed,
    /// A notification action finished with the given beacon resolution.
    Beacons(BeaconResolution),
}

impl ActionOutcome {
    /// Returns a short stable label for logs/events.
    pub fn as_label(&self) -> &'static str {
        match self {
            ActionOutcome::Completed => "completed",
            ActionOutcome::Beacons(BeaconResolution::RetrievedAndParsed { matched: true }) => {
                "beacons_parsed_matched"
            }
            ActionOutcome::Beacons(BeaconResolution::RetrievedAndParsed { matched: false }) => {
                "beacons_parsed_unmatched"
            }
            ActionOutcome::Beacons(BeaconResolution::RetrievedButBad) => "beacons_bad",
            ActionOutcome::Beacons(BeaconResolution::HttpBadResponse) => "beacons_http_bad_response",
            ActionOutcome::Beacons(BeaconResolution::NetworkProblem) => "beacons_network_problem",
            ActionOutcome::Beacons(BeaconResolution::Killed) => "beacons_killed",
        }
    }
}

/// # A unit of work directed at one remote peer.
///
/// Implementors own their protocol logic; the pool only schedules them.
///
/// ### Contract
/// - `start` is invoked at most once, with a connection agent built from
///   [`psk_identity`](PeerAction::psk_identity) and [`psk_key`](PeerAction::psk_key).
/// - `kill` is invoked by the pool exactly once per submission, after `start`
///   settles or instead of `start` when the action is rejected. It must also be
///   safe to call when the action already terminated on its own.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use peerpool::{ActionError, ActionOutcome, ActionType, ConnectionAgent, PeerAction};
///
/// struct Ping { peer: String }
///
/// #[async_trait]
/// impl PeerAction for Ping {
///     fn id(&self) -> &str { "ping-1" }
///     fn peer_identifier(&self) -> &str { &self.peer }
///     fn action_type(&self) -> ActionType { ActionType::Other("ping") }
///     fn psk_identity(&self) -> &str { "ping-identity" }
///     fn psk_key(&self) -> &[u8] { b"secret" }
///
///     async fn start(&self, _agent: ConnectionAgent) -> Result<ActionOutcome, ActionError> {
///         Ok(ActionOutcome::Completed)
///     }
///
///     fn kill(&self) {}
/// }
/// ```
#[async_trait]
pub trait PeerAction: Send + Sync + 'static {
    /// Returns the action's unique id.
    fn id(&self) -> &str;

    /// Returns the identifier of the remote peer.
    fn peer_identifier(&self) -> &str;

    /// Returns the kind of work this action performs.
    fn action_type(&self) -> ActionType;

    /// Returns the PSK identity used to connect to the peer.
    fn psk_identity(&self) -> &str;

    /// Returns the PSK secret used to connect to the peer.
    fn psk_key(&self) -> &[u8];

    /// Runs the action against the peer using `agent`.
    async fn start(&self, agent: ConnectionAgent) -> Result<ActionOutcome, ActionError>;

    /// Tears the action down. Idempotent.
    fn kill(&self);
}
