//! # Runtime events emitted by the pool and its admission policies.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Pool events**: state transitions (started, stopped)
//! - **Admission events**: enqueue, admit, reject, counter violations
//! - **Lifecycle events**: action execution (starting, succeeded, failed, killed)
//! - **Medium events**: peer disconnects issued by the serial lane
//!
//! The [`Event`] struct carries metadata such as timestamps, action id, peer,
//! action type, reasons and replication counts.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use peerpool::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ActionFailed)
//!     .with_action("a1")
//!     .with_peer("p1")
//!     .with_reason("connection reset");
//!
//! assert_eq!(ev.kind, EventKind::ActionFailed);
//! assert_eq!(ev.action.as_deref(), Some("a1"));
//! assert_eq!(ev.peer.as_deref(), Some("p1"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::actions::{ActionType, PeerAction};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `reason`: `subscriber=<name> info=<panic info>`
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `reason`: `subscriber=<name> reason=<full|closed>`
    SubscriberOverflow,

    // === Pool events ===
    /// Pool moved from stopped to running.
    PoolStarted,

    /// Pool moved from running to stopped; replication counts were reset.
    PoolStopped,

    // === Admission events ===
    /// Action accepted by `enqueue` and handed to the admission policy.
    ///
    /// Sets: `action`, `peer`, `action_type`
    ActionEnqueued,

    /// Action admitted for execution (started now or appended to the serial lane).
    ///
    /// Sets: `action`, `peer`, `action_type`, `count` (replication actions only)
    ActionAdmitted,

    /// Action rejected by policy and killed without being started.
    ///
    /// Sets: `action`, `peer`, `action_type`, `reason`, `count`
    ActionRejected,

    /// Replication count observed outside `{0, 1, 2}`.
    ///
    /// Sets: `peer`, `count`, `reason`
    CounterInvariantViolated,

    // === Lifecycle events ===
    /// Action start is about to be invoked with a fresh connection agent.
    ///
    /// Sets: `action`, `peer`, `action_type`
    ActionStarting,

    /// Action start resolved successfully.
    ///
    /// Sets: `action`, `peer`, `action_type`, `reason` (outcome label)
    ActionSucceeded,

    /// Action start rejected or panicked.
    ///
    /// Sets: `action`, `peer`, `action_type`, `reason` (error message)
    ActionFailed,

    /// Pool invoked the action's kill hook.
    ///
    /// Sets: `action`, `peer`, `action_type`, `reason` (only when `kill` panicked)
    ActionKilled,

    // === Medium events ===
    /// Serial lane tore down the transport connection to a peer.
    ///
    /// Sets: `peer`
    PeerDisconnected,

    /// Serial lane failed to tear down the transport connection to a peer.
    ///
    /// Sets: `peer`, `reason`
    DisconnectFailed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Action id, if applicable.
    pub action: Option<Arc<str>>,
    /// Peer identifier, if applicable.
    pub peer: Option<Arc<str>>,
    /// Action type, if applicable.
    pub action_type: Option<ActionType>,
    /// Human-readable reason (errors, outcome labels, overflow details).
    pub reason: Option<Arc<str>>,
    /// Replication count for `peer` after the decision.
    pub count: Option<u8>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            action: None,
            peer: None,
            action_type: None,
            reason: None,
            count: None,
        }
    }

    /// Attaches an action id.
    #[inline]
    pub fn with_action(mut self, id: impl Into<Arc<str>>) -> Self {
        self.action = Some(id.into());
        self
    }

    /// Attaches a peer identifier.
    #[inline]
    pub fn with_peer(mut self, peer: impl Into<Arc<str>>) -> Self {
        self.peer = Some(peer.into());
        self
    }

    /// Attaches an action type.
    #[inline]
    pub fn with_action_type(mut self, ty: ActionType) -> Self {
        self.action_type = Some(ty);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a replication count.
    #[inline]
    pub fn with_count(mut self, count: u8) -> Self {
        self.count = Some(count);
        self
    }

    /// Creates an event describing `action` (id, peer and type set).
    pub fn for_action(kind: EventKind, action: &dyn PeerAction) -> Self {
        Event::new(kind)
            .with_action(action.id())
            .with_peer(action.peer_identifier())
            .with_action_type(action.action_type())
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }

    /// Returns true for [`EventKind::SubscriberOverflow`] events.
    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
