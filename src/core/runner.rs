//! # Run a single admitted action with mandatory cleanup.
//!
//! Executes one [`AdmittedAction`]: builds its connection agent, awaits `start`,
//! then kills it. Both policies funnel every execution through [`run_once`].
//!
//! ## Event flow
//! ```text
//! Success:
//!   ActionStarting → start() → Ok(outcome) → ActionSucceeded → kill → ActionKilled
//!
//! Failure:
//!   ActionStarting → start() → Err(e)      → ActionFailed    → kill → ActionKilled
//!
//! Panic:
//!   ActionStarting → start() panics        → ActionFailed    → kill → ActionKilled
//! ```
//!
//! ## Rules
//! - `kill` runs **exactly once**, after `start` settles, whatever the result
//! - Panics inside `start` are caught and converted to [`ActionError::Panicked`]
//! - Panics inside `kill` are caught too; `ActionKilled` then carries the panic as `reason`
//! - Errors are logged and published, never returned to the enqueue caller

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, warn};

use crate::{
    actions::{ActionOutcome, AdmittedAction},
    agent::AgentFactory,
    error::ActionError,
    events::{Bus, Event, EventKind},
};

/// Executes `admitted` once and tears it down.
///
/// Returns the settled result so the caller can inspect it (the serial lane
/// uses it for its disconnect decision).
pub(crate) async fn run_once(
    admitted: AdmittedAction,
    agents: &AgentFactory,
    bus: &Bus,
) -> Result<ActionOutcome, ActionError> {
    let action = Arc::clone(admitted.action());
    let agent = agents.for_action(action.as_ref());

    bus.publish(Event::for_action(EventKind::ActionStarting, action.as_ref()));

    let res = match AssertUnwindSafe(action.start(agent)).catch_unwind().await {
        Ok(res) => res,
        Err(payload) => Err(ActionError::Panicked {
            info: panic_message(payload.as_ref()),
        }),
    };

    match &res {
        Ok(outcome) => {
            debug!(
                action = action.id(),
                peer = action.peer_identifier(),
                outcome = outcome.as_label(),
                "action settled"
            );
            bus.publish(
                Event::for_action(EventKind::ActionSucceeded, action.as_ref())
                    .with_reason(outcome.as_label()),
            );
        }
        Err(e) => {
            warn!(
                action = action.id(),
                peer = action.peer_identifier(),
                error = %e,
                label = e.as_label(),
                "action failed"
            );
            bus.publish(
                Event::for_action(EventKind::ActionFailed, action.as_ref()).with_reason(e.to_string()),
            );
        }
    }

    let mut killed = Event::for_action(EventKind::ActionKilled, action.as_ref());
    if let Err(e) = admitted.kill() {
        warn!(
            action = action.id(),
            peer = action.peer_identifier(),
            error = %e,
            "action kill panicked"
        );
        killed = killed.with_reason(e.to_string());
    }
    bus.publish(killed);
    res
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
