//! # Admitted action: the pool-owned teardown decorator.
//!
//! Once a policy admits an action it wraps it in [`AdmittedAction`], which
//! carries the pool's own teardown metadata (a replication permit on the
//! parallel medium). The action itself never learns about the counter.
//!
//! ```text
//! AdmittedAction::kill(self)
//!   ├─► action.kill()          (the action's own teardown, always first; panics caught)
//!   └─► permit.release()       (pool bookkeeping, if any)
//! ```
//!
//! `kill` consumes the wrapper, so the pool cannot kill the same admission twice.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::actions::action::{ActionRef, PeerAction};
use crate::core::runner::panic_message;
use crate::error::ActionError;
use crate::policies::ReplicationPermit;

/// An action that passed admission, plus pool-owned teardown state.
pub(crate) struct AdmittedAction {
    action: ActionRef,
    permit: Option<ReplicationPermit>,
}

impl AdmittedAction {
    /// Wraps an action that needs no extra bookkeeping.
    pub(crate) fn new(action: ActionRef) -> Self {
        Self {
            action,
            permit: None,
        }
    }

    /// Wraps an action holding a replication slot.
    pub(crate) fn with_permit(action: ActionRef, permit: ReplicationPermit) -> Self {
        Self {
            action,
            permit: Some(permit),
        }
    }

    /// The wrapped action.
    pub(crate) fn action(&self) -> &ActionRef {
        &self.action
    }

    /// Runs the action's teardown, then releases pool bookkeeping.
    ///
    /// The permit is released even if the action's `kill` panics.
    pub(crate) fn kill(mut self) -> Result<(), ActionError> {
        let res = kill_caught(self.action.as_ref());
        if let Some(mut permit) = self.permit.take() {
            permit.release();
        }
        res
    }
}

/// Invokes `action.kill()`, converting a panic into [`ActionError::Panicked`].
pub(crate) fn kill_caught(action: &dyn PeerAction) -> Result<(), ActionError> {
    catch_unwind(AssertUnwindSafe(|| action.kill())).map_err(|payload| ActionError::Panicked {
        info: panic_message(payload.as_ref()),
    })
}
