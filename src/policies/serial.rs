//! # Serial lane admission (Bluetooth-like mediums).
//!
//! Every admitted action is appended to a FIFO lane drained by one worker task.
//!
//! ## Architecture
//! ```text
//! admit(action) ──► [unbounded mpsc] ──► lane worker
//!                                         loop {
//!                                           ├─► recv unit (FIFO)
//!                                           ├─► run_once(unit): agent → start → kill
//!                                           ├─► requires_disconnect(type, result)?
//!                                           │     └─► await disconnector.disconnect(peer)
//!                                           └─► next unit
//!                                         }
//! ```
//!
//! ## Rules
//! - At most one unit runs at a time; units never skip or reorder.
//! - The next unit starts only after the previous one was killed and any
//!   required disconnect resolved.
//! - `close` stops admission; units already queued still drain in order.
//! - Panics in an action's `kill` or in the disconnector are caught; the
//!   worker never dies with units still queued.
//! - `open` after `close` spawns a new worker that first waits for the old
//!   one to drain, so the medium never sees two actions at once.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::actions::{ActionRef, AdmittedAction};
use crate::core::runner::{panic_message, run_once};
use crate::error::DisconnectError;
use crate::events::{Event, EventKind};
use crate::policies::admission::{AdmissionPolicy, PolicyContext, Rejection};
use crate::policies::disconnect::{PeerDisconnector, requires_disconnect};

#[derive(Default)]
struct LaneState {
    tx: Option<mpsc::UnboundedSender<AdmittedAction>>,
    worker: Option<JoinHandle<()>>,
}

/// Runs admitted actions one at a time in submission order.
pub(crate) struct SerialPolicy {
    ctx: PolicyContext,
    disconnector: Arc<dyn PeerDisconnector>,
    lane: Mutex<LaneState>,
}

impl SerialPolicy {
    pub(crate) fn new(ctx: PolicyContext, disconnector: Arc<dyn PeerDisconnector>) -> Self {
        Self {
            ctx,
            disconnector,
            lane: Mutex::new(LaneState::default()),
        }
    }
}

impl AdmissionPolicy for SerialPolicy {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn open(&self) {
        let mut lane = self.lane.lock();
        let (tx, rx) = mpsc::unbounded_channel();
        let previous = lane.worker.take();

        let worker = drain_lane(
            previous,
            rx,
            self.ctx.clone(),
            Arc::clone(&self.disconnector),
        );
        lane.worker = Some(self.ctx.runtime.spawn(worker));
        lane.tx = Some(tx);
    }

    fn close(&self) {
        // Dropping the sender lets the worker finish what is queued, then exit.
        self.lane.lock().tx = None;
    }

    fn admit(&self, action: ActionRef) -> Result<(), Rejection> {
        let lane = self.lane.lock();
        let Some(tx) = lane.tx.as_ref() else {
            return Err(Rejection::new(action, "serial_lane_closed", None));
        };

        self.ctx.admitted(action.as_ref(), None);
        tx.send(AdmittedAction::new(action))
            .map_err(|mpsc::error::SendError(unit)| {
                warn!("serial lane worker is gone; rejecting queued action");
                Rejection::new(Arc::clone(unit.action()), "serial_lane_worker_gone", None)
            })
    }
}

/// Lane worker: drains `rx` strictly in order.
async fn drain_lane(
    previous: Option<JoinHandle<()>>,
    mut rx: mpsc::UnboundedReceiver<AdmittedAction>,
    ctx: PolicyContext,
    disconnector: Arc<dyn PeerDisconnector>,
) {
    if let Some(previous) = previous {
        let _ = previous.await;
    }

    while let Some(unit) = rx.recv().await {
        let peer = unit.action().peer_identifier().to_owned();
        let ty = unit.action().action_type();

        let res = run_once(unit, &ctx.agents, &ctx.bus).await;

        if requires_disconnect(ty, &res) {
            debug!(peer = %peer, action_type = %ty, "disconnecting before next unit");
            let res = match AssertUnwindSafe(disconnector.disconnect(&peer))
                .catch_unwind()
                .await
            {
                Ok(res) => res,
                Err(payload) => Err(DisconnectError::Transport {
                    peer: peer.clone(),
                    error: format!("disconnect panicked: {}", panic_message(payload.as_ref())),
                }),
            };
            match res {
                Ok(()) => {
                    ctx.bus
                        .publish(Event::new(EventKind::PeerDisconnected).with_peer(peer.as_str()));
                }
                Err(e) => {
                    warn!(peer = %peer, error = %e, label = e.as_label(), "peer disconnect failed");
                    ctx.bus.publish(
                        Event::new(EventKind::DisconnectFailed)
                            .with_peer(peer.as_str())
                            .with_reason(e.to_string()),
                    );
                }
            }
        }
    }
    debug!("serial lane drained");
}
