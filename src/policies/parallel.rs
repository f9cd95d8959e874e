//! # Unconstrained-parallel admission (WiFi-like mediums).
//!
//! ```text
//! admit(action)
//!   ├─ not replication ─────────────────► spawn now
//!   └─ replication ─► counter.try_acquire(peer)
//!                       ├─ Admitted(permit) ► spawn now (permit released on kill)
//!                       ├─ AtCapacity ──────► Rejection (pool kills, no start)
//!                       └─ Violation ───────► Rejection (logged)
//! ```
//!
//! Total parallelism is not bounded here; the connection agent's socket
//! limits are the ceiling.

use std::sync::Arc;

use crate::actions::{ActionRef, ActionType, AdmittedAction};
use crate::policies::admission::{AdmissionPolicy, PolicyContext, Rejection};
use crate::policies::counter::{Acquire, MAX_REPLICATIONS_PER_PEER, ReplicationCounter};

/// Starts every action immediately, capping replications per peer.
pub(crate) struct ParallelPolicy {
    ctx: PolicyContext,
    counter: Arc<ReplicationCounter>,
}

impl ParallelPolicy {
    pub(crate) fn new(ctx: PolicyContext) -> Self {
        let counter = ReplicationCounter::new(ctx.bus.clone());
        Self { ctx, counter }
    }

    #[cfg(test)]
    pub(crate) fn counter(&self) -> &Arc<ReplicationCounter> {
        &self.counter
    }
}

impl AdmissionPolicy for ParallelPolicy {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn open(&self) {}

    fn close(&self) {
        self.counter.reset();
    }

    fn admit(&self, action: ActionRef) -> Result<(), Rejection> {
        if action.action_type() != ActionType::Replication {
            self.ctx.admitted(action.as_ref(), None);
            self.ctx.spawn_run(AdmittedAction::new(action));
            return Ok(());
        }

        match self.counter.try_acquire(action.peer_identifier()) {
            Acquire::Admitted(permit) => {
                self.ctx
                    .admitted(action.as_ref(), Some(permit.count_at_admission()));
                self.ctx
                    .spawn_run(AdmittedAction::with_permit(action, permit));
                Ok(())
            }
            Acquire::AtCapacity => Err(Rejection::new(
                action,
                "replication_cap_reached",
                Some(MAX_REPLICATIONS_PER_PEER),
            )),
            Acquire::Violation(count) => Err(Rejection::new(
                action,
                "replication_count_invalid",
                Some(count),
            )),
        }
    }

    fn replication_count(&self, peer: &str) -> u8 {
        self.counter.count(peer)
    }
}
