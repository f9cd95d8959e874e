//! # Per-peer replication counter.
//!
//! Caps concurrent replication actions against a single peer at
//! [`MAX_REPLICATIONS_PER_PEER`]. Only the parallel policy uses it.
//!
//! ## State machine (per peer)
//! ```text
//! absent ──acquire──► 1 ──acquire──► 2 ──acquire──► AtCapacity (no change)
//!   ▲                 │              │
//!   └────release──────┘ ◄──release───┘
//! ```
//!
//! ## Rules
//! - Counts live in `{0, 1, 2}`; `0` is never stored (absent).
//! - Any other observed value is an invariant violation: logged, published,
//!   never fatal.
//! - [`reset`](ReplicationCounter::reset) clears the table and bumps the
//!   generation. Permits issued before the reset release as no-ops.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::error::PoolError;
use crate::events::{Bus, Event, EventKind};

/// Maximum number of replication actions admitted per peer at once.
pub const MAX_REPLICATIONS_PER_PEER: u8 = 2;

#[derive(Default)]
struct CounterState {
    generation: u64,
    counts: HashMap<String, u8>,
}

/// Result of [`ReplicationCounter::try_acquire`].
#[derive(Debug)]
pub(crate) enum Acquire {
    /// Admission granted; the permit decrements the count when released.
    Admitted(ReplicationPermit),
    /// The peer already has the maximum number of replications in flight.
    AtCapacity,
    /// The stored count was corrupt; nothing was changed.
    Violation(u8),
}

/// Table of in-flight replication counts keyed by peer identifier.
pub struct ReplicationCounter {
    state: Mutex<CounterState>,
    bus: Bus,
}

impl ReplicationCounter {
    /// Creates an empty counter publishing violations to `bus`.
    pub fn new(bus: Bus) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(CounterState::default()),
            bus,
        })
    }

    /// Tries to admit one more replication against `peer`.
    pub(crate) fn try_acquire(self: &Arc<Self>, peer: &str) -> Acquire {
        let mut state = self.state.lock();
        let count = state.counts.get(peer).copied().unwrap_or(0);

        match count {
            0 | 1 => {
                let next = count + 1;
                state.counts.insert(peer.to_owned(), next);
                let generation = state.generation;
                drop(state);

                debug!(peer, count = next, "replication slot acquired");
                Acquire::Admitted(ReplicationPermit {
                    counter: Arc::clone(self),
                    peer: peer.to_owned(),
                    generation,
                    count: next,
                    released: false,
                })
            }
            MAX_REPLICATIONS_PER_PEER => Acquire::AtCapacity,
            other => {
                drop(state);
                self.report_violation(peer, other);
                Acquire::Violation(other)
            }
        }
    }

    /// Returns the current count for `peer` (`0` when absent).
    pub fn count(&self, peer: &str) -> u8 {
        self.state.lock().counts.get(peer).copied().unwrap_or(0)
    }

    /// Returns a sorted copy of all non-zero counts.
    pub fn snapshot(&self) -> Vec<(String, u8)> {
        let state = self.state.lock();
        let mut counts: Vec<(String, u8)> = state
            .counts
            .iter()
            .map(|(peer, count)| (peer.clone(), *count))
            .collect();
        counts.sort_unstable();
        counts
    }

    /// Clears every count and invalidates outstanding permits.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.generation += 1;
        state.counts.clear();
    }

    fn release(&self, peer: &str, generation: u64) {
        let mut state = self.state.lock();
        if state.generation != generation {
            debug!(peer, "stale replication permit released after reset");
            return;
        }

        match state.counts.get(peer).copied() {
            Some(2) => {
                state.counts.insert(peer.to_owned(), 1);
                debug!(peer, count = 1, "replication slot released");
            }
            Some(1) => {
                state.counts.remove(peer);
                debug!(peer, count = 0, "replication slot released");
            }
            other => {
                let count = other.unwrap_or(0);
                if count == 0 {
                    state.counts.remove(peer);
                }
                drop(state);
                self.report_violation(peer, count);
            }
        }
    }

    fn report_violation(&self, peer: &str, count: u8) {
        let err = PoolError::InvariantViolation {
            peer: peer.to_owned(),
            count,
        };
        error!(peer, count, label = err.as_label(), "{err}");
        self.bus.publish(
            Event::new(EventKind::CounterInvariantViolated)
                .with_peer(peer)
                .with_count(count)
                .with_reason(err.to_string()),
        );
    }

    #[cfg(test)]
    pub(crate) fn force_count(&self, peer: &str, count: u8) {
        self.state.lock().counts.insert(peer.to_owned(), count);
    }
}

/// Claim on one replication slot for a peer.
///
/// Released exactly once: explicitly through [`release`](Self::release) or on drop.
#[derive(Debug)]
pub struct ReplicationPermit {
    counter: Arc<ReplicationCounter>,
    peer: String,
    generation: u64,
    count: u8,
    released: bool,
}

impl ReplicationPermit {
    /// Peer this permit was issued for.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Count for the peer right after this permit was issued.
    pub fn count_at_admission(&self) -> u8 {
        self.count
    }

    /// Returns the slot to the counter. Later calls are no-ops.
    pub fn release(&mut self) {
        if std::mem::replace(&mut self.released, true) {
            return;
        }
        self.counter.release(&self.peer, self.generation);
    }
}

impl Drop for ReplicationPermit {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ReplicationCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicationCounter")
            .field("counts", &self.snapshot())
            .finish()
    }
}
