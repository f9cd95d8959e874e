//! # Peer actions.
//!
//! - [`PeerAction`] - trait implemented by replication/notification actions
//! - [`ActionRef`] - shared reference to an action (`Arc<dyn PeerAction>`)
//! - [`ActionType`], [`ActionOutcome`], [`BeaconResolution`] - what the pool may inspect
//! - `AdmittedAction` - crate-internal decorator carrying teardown bookkeeping

mod action;
mod admitted;

pub use action::{ActionOutcome, ActionRef, ActionType, BeaconResolution, PeerAction};
pub(crate) use admitted::{AdmittedAction, kill_caught};
