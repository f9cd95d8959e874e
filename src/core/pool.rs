//! # PeerActionPool: admission, lifecycle and cleanup of peer actions.
//!
//! The [`PeerActionPool`] owns the running flag, the event bus and one
//! admission policy selected from the configured [`Medium`](crate::Medium).
//!
//! ## Key responsibilities
//! - gate `enqueue` on the running state (`AlreadyStopped` while stopped)
//! - route each action to the policy (parallel + counter, or serial lane)
//! - reset per-peer bookkeeping on `stop`
//! - guarantee every admitted action is killed exactly once after `start` settles
//!
//! ## State machine
//! ```text
//!            start()                       stop()
//! Stopped ───────────► Running ───────────────────► Stopped
//!    ▲  start() while Running → AlreadyRunning        │
//!    └──── stop() while Stopped → no-op ◄─────────────┘
//! ```
//!
//! ## Control flow
//! ```text
//! enqueue(action)
//!   ├─ stopped ─► Err(AlreadyStopped), action untouched
//!   └─ running ─► publish ActionEnqueued ─► policy.admit(action) ─► Ok(())
//!                                             ├─ spawn run_once   (parallel)
//!                                             ├─ push to lane     (serial)
//!                                             └─ kill, no start   (rejected)
//! ```
//!
//! Admission decisions are taken under the pool's state lock, so no two
//! decisions interleave and none happens after `stop` has reset the counters.
//! Rejected actions are killed after the lock is released, so `kill` may call
//! back into the pool.
//!
//! ## Example
//! ```rust
//! use peerpool::{Medium, PeerActionPool, PoolConfig, PoolError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), PoolError> {
//!     let pool = PeerActionPool::builder(PoolConfig::for_medium(Medium::Wifi)).build();
//!
//!     pool.start()?;
//!     assert!(pool.is_running());
//!     assert_eq!(pool.start(), Err(PoolError::AlreadyRunning));
//!
//!     pool.stop();
//!     pool.stop(); // idempotent
//!     assert!(!pool.is_running());
//!     Ok(())
//! }
//! ```

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    actions::ActionRef,
    core::{PoolBuilder, config::PoolConfig},
    error::PoolError,
    events::{Bus, Event, EventKind},
    policies::AdmissionPolicy,
};

/// Pool state: a single running flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PoolState {
    Stopped,
    Running,
}

/// Admission pool for peer actions.
pub struct PeerActionPool {
    cfg: PoolConfig,
    bus: Bus,
    state: Mutex<PoolState>,
    policy: Box<dyn AdmissionPolicy>,
    listener_token: CancellationToken,
}

impl PeerActionPool {
    /// Returns a builder for a pool with the given configuration.
    pub fn builder(cfg: PoolConfig) -> PoolBuilder {
        PoolBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: PoolConfig,
        bus: Bus,
        policy: Box<dyn AdmissionPolicy>,
        listener_token: CancellationToken,
    ) -> Self {
        Self {
            cfg,
            bus,
            state: Mutex::new(PoolState::Stopped),
            policy,
            listener_token,
        }
    }

    /// Moves the pool to running and enables `enqueue`.
    ///
    /// Returns [`PoolError::AlreadyRunning`] if the pool is already running.
    pub fn start(&self) -> Result<(), PoolError> {
        let mut state = self.state.lock();
        if *state == PoolState::Running {
            return Err(PoolError::AlreadyRunning);
        }

        *state = PoolState::Running;
        self.policy.open();
        info!(medium = %self.cfg.medium, policy = self.policy.name(), "peer action pool started");
        self.bus.publish(Event::new(EventKind::PoolStarted));
        Ok(())
    }

    /// Moves the pool to stopped and resets per-peer replication counts.
    ///
    /// In-flight actions keep running and are still killed when they settle.
    /// Calling `stop` on a stopped pool is a no-op.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if *state == PoolState::Stopped {
            return;
        }

        *state = PoolState::Stopped;
        self.policy.close();
        info!(medium = %self.cfg.medium, "peer action pool stopped");
        self.bus.publish(Event::new(EventKind::PoolStopped));
    }

    /// Hands `action` to the medium's admission policy and returns immediately.
    ///
    /// The action's own result channel reports how it ran; this only reports
    /// whether the pool accepted it. Returns [`PoolError::AlreadyStopped`]
    /// while the pool is stopped, in which case the action is neither started
    /// nor killed.
    pub fn enqueue(&self, action: ActionRef) -> Result<(), PoolError> {
        let decision = {
            let state = self.state.lock();
            if *state == PoolState::Stopped {
                debug!(action = action.id(), "enqueue refused, pool stopped");
                return Err(PoolError::AlreadyStopped);
            }

            self.bus
                .publish(Event::for_action(EventKind::ActionEnqueued, action.as_ref()));
            self.policy.admit(action)
        };

        // The rejected action's kill runs with the state lock released.
        if let Err(rejection) = decision {
            rejection.settle(&self.bus);
        }
        Ok(())
    }

    /// Returns true while the pool accepts actions.
    pub fn is_running(&self) -> bool {
        *self.state.lock() == PoolState::Running
    }

    /// Medium this pool schedules over.
    pub fn medium(&self) -> crate::Medium {
        self.cfg.medium
    }

    /// Configuration the pool was built with.
    pub fn config(&self) -> &PoolConfig {
        &self.cfg
    }

    /// In-flight replication count for `peer` (always `0` on serialized mediums).
    pub fn replication_count(&self, peer: &str) -> u8 {
        self.policy.replication_count(peer)
    }

    /// Subscribes to pool events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }
}

impl Drop for PeerActionPool {
    fn drop(&mut self) {
        self.policy.close();
        self.listener_token.cancel();
    }
}
