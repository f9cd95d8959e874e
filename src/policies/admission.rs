//! # Admission policy contract.
//!
//! The pool owns exactly one policy, chosen from the configured
//! [`Medium`](crate::Medium) at build time:
//! - [`ParallelPolicy`](super::ParallelPolicy) for WiFi-like mediums,
//! - [`SerialPolicy`](super::SerialPolicy) for Bluetooth-like mediums.
//!
//! ## Invariants
//! - `admit` never awaits and never calls into the action; it either spawns,
//!   queues, or hands back a [`Rejection`].
//! - The pool settles a [`Rejection`] only after releasing its own lock, so an
//!   action's `kill` may call back into the pool.
//! - An action handed to `admit` is killed exactly once, whatever the decision.

use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::actions::{ActionRef, AdmittedAction, PeerAction, kill_caught};
use crate::agent::AgentFactory;
use crate::core::runner::run_once;
use crate::events::{Bus, Event, EventKind};

/// Shared collaborators every policy needs to run actions.
#[derive(Clone)]
pub(crate) struct PolicyContext {
    pub bus: Bus,
    pub agents: AgentFactory,
    pub runtime: Handle,
}

impl PolicyContext {
    /// Spawns one execution of `admitted` on the pool's runtime.
    pub(crate) fn spawn_run(&self, admitted: AdmittedAction) {
        let ctx = self.clone();
        self.runtime.spawn(async move {
            let _ = run_once(admitted, &ctx.agents, &ctx.bus).await;
        });
    }

    /// Publishes an admission of `action`.
    pub(crate) fn admitted(&self, action: &dyn PeerAction, count: Option<u8>) {
        let mut ev = Event::for_action(EventKind::ActionAdmitted, action);
        if let Some(count) = count {
            ev = ev.with_count(count);
        }
        self.bus.publish(ev);
    }
}

/// An action a policy refused; it must be killed without being started.
#[must_use = "a rejected action must be settled so it is killed"]
pub(crate) struct Rejection {
    action: ActionRef,
    reason: &'static str,
    count: Option<u8>,
}

impl Rejection {
    pub(crate) fn new(action: ActionRef, reason: &'static str, count: Option<u8>) -> Self {
        Self {
            action,
            reason,
            count,
        }
    }

    /// Kills the action and publishes `ActionRejected`.
    ///
    /// Runs caller code; never call it while holding a pool lock.
    pub(crate) fn settle(self, bus: &Bus) {
        let action = self.action.as_ref();
        info!(
            action = action.id(),
            peer = action.peer_identifier(),
            reason = self.reason,
            "action rejected without start"
        );
        if let Err(e) = kill_caught(action) {
            warn!(action = action.id(), error = %e, "kill of rejected action panicked");
        }

        let mut ev = Event::for_action(EventKind::ActionRejected, action).with_reason(self.reason);
        if let Some(count) = self.count {
            ev = ev.with_count(count);
        }
        bus.publish(ev);
    }
}

/// Admission policy shared contract.
pub(crate) trait AdmissionPolicy: Send + Sync {
    /// Stable policy name for logs.
    fn name(&self) -> &'static str;

    /// Called when the pool transitions to running.
    fn open(&self);

    /// Called when the pool transitions to stopped.
    fn close(&self);

    /// Admits or queues `action`, or hands it back as a [`Rejection`]. Never blocks.
    fn admit(&self, action: ActionRef) -> Result<(), Rejection>;

    /// In-flight replication count for `peer` (`0` when the policy does not count).
    fn replication_count(&self, _peer: &str) -> u8 {
        0
    }
}
