//! # LogWriter — event logger
//!
//! A subscriber that renders every [`Event`] through `tracing`.
//! Install a `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see the output.
//!
//! ## Example output
//! ```text
//! INFO  pool started
//! DEBUG action admitted action="a1" peer="p1" type=replication count=1
//! INFO  action rejected action="a3" peer="p1" reason="replication_cap_reached"
//! WARN  action failed action="a2" peer="p1" err="connection reset"
//! DEBUG peer disconnected peer="p1"
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let action = e.action.as_deref().unwrap_or("-");
        let peer = e.peer.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::PoolStarted => info!(seq = e.seq, "pool started"),
            EventKind::PoolStopped => info!(seq = e.seq, "pool stopped"),
            EventKind::ActionEnqueued => debug!(seq = e.seq, action, peer, "action enqueued"),
            EventKind::ActionAdmitted => {
                debug!(seq = e.seq, action, peer, count = ?e.count, "action admitted")
            }
            EventKind::ActionRejected => {
                info!(seq = e.seq, action, peer, reason, "action rejected")
            }
            EventKind::ActionStarting => debug!(seq = e.seq, action, peer, "action starting"),
            EventKind::ActionSucceeded => {
                debug!(seq = e.seq, action, peer, outcome = reason, "action succeeded")
            }
            EventKind::ActionFailed => warn!(seq = e.seq, action, peer, err = reason, "action failed"),
            EventKind::ActionKilled => match e.reason.as_deref() {
                Some(err) => warn!(seq = e.seq, action, peer, err, "action kill panicked"),
                None => debug!(seq = e.seq, action, peer, "action killed"),
            },
            EventKind::PeerDisconnected => debug!(seq = e.seq, peer, "peer disconnected"),
            EventKind::DisconnectFailed => {
                warn!(seq = e.seq, peer, err = reason, "peer disconnect failed")
            }
            EventKind::CounterInvariantViolated => {
                error!(seq = e.seq, peer, count = ?e.count, reason, "replication counter invariant violated")
            }
            EventKind::SubscriberOverflow => warn!(seq = e.seq, reason, "subscriber overflow"),
            EventKind::SubscriberPanicked => error!(seq = e.seq, reason, "subscriber panicked"),
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
