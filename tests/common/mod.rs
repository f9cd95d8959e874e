#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use peerpool::{
    ActionError, ActionOutcome, ActionType, AgentOptions, ConnectionAgent, DisconnectError, Event,
    EventKind, PeerAction, PeerDisconnector,
};
use tokio::sync::{Notify, broadcast};

/// Shared, ordered record of what happened across actions and disconnects.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }
}

#[derive(Clone)]
enum Behavior {
    Succeed(ActionOutcome),
    Fail(String),
    Panic,
}

type KillHook = Box<dyn Fn() + Send + Sync>;

/// Recording action used by the integration tests.
pub struct MockAction {
    id: String,
    peer: String,
    ty: ActionType,
    behavior: Behavior,
    gate: Option<Notify>,
    delay: Option<Duration>,
    starts: AtomicUsize,
    kills: AtomicUsize,
    agent: Mutex<Option<ConnectionAgent>>,
    on_kill: Option<KillHook>,
    journal: Journal,
}

impl MockAction {
    pub fn new(id: &str, peer: &str, ty: ActionType) -> Self {
        Self {
            id: id.to_owned(),
            peer: peer.to_owned(),
            ty,
            behavior: Behavior::Succeed(ActionOutcome::Completed),
            gate: None,
            delay: None,
            starts: AtomicUsize::new(0),
            kills: AtomicUsize::new(0),
            agent: Mutex::new(None),
            on_kill: None,
            journal: Journal::default(),
        }
    }

    pub fn replication(id: &str, peer: &str) -> Self {
        Self::new(id, peer, ActionType::Replication)
    }

    pub fn notification(id: &str, peer: &str) -> Self {
        Self::new(id, peer, ActionType::Notification)
    }

    /// `start` waits until [`release`](Self::release) is called.
    pub fn held(mut self) -> Self {
        self.gate = Some(Notify::new());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_outcome(mut self, outcome: ActionOutcome) -> Self {
        self.behavior = Behavior::Succeed(outcome);
        self
    }

    pub fn failing(mut self, error: &str) -> Self {
        self.behavior = Behavior::Fail(error.to_owned());
        self
    }

    pub fn panicking(mut self) -> Self {
        self.behavior = Behavior::Panic;
        self
    }

    /// Runs `hook` inside `kill`, after the kill is recorded.
    pub fn on_kill(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_kill = Some(Box::new(hook));
        self
    }

    pub fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = journal.clone();
        self
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn kills(&self) -> usize {
        self.kills.load(Ordering::SeqCst)
    }

    pub fn agent_identity(&self) -> Option<String> {
        self.agent
            .lock()
            .unwrap()
            .as_ref()
            .map(|agent| agent.credential().identity().to_owned())
    }

    pub fn agent_options(&self) -> Option<AgentOptions> {
        self.agent
            .lock()
            .unwrap()
            .as_ref()
            .map(|agent| agent.options().clone())
    }
}

#[async_trait]
impl PeerAction for MockAction {
    fn id(&self) -> &str {
        &self.id
    }

    fn peer_identifier(&self) -> &str {
        &self.peer
    }

    fn action_type(&self) -> ActionType {
        self.ty
    }

    fn psk_identity(&self) -> &str {
        &self.peer
    }

    fn psk_key(&self) -> &[u8] {
        b"test-psk-key"
    }

    async fn start(&self, agent: ConnectionAgent) -> Result<ActionOutcome, ActionError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        *self.agent.lock().unwrap() = Some(agent);
        self.journal.push(format!("start:{}", self.id));

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.journal.push(format!("end:{}", self.id));
        match &self.behavior {
            Behavior::Succeed(outcome) => Ok(*outcome),
            Behavior::Fail(error) => Err(ActionError::fail(error.clone())),
            Behavior::Panic => panic!("mock action {} exploded", self.id),
        }
    }

    fn kill(&self) {
        self.kills.fetch_add(1, Ordering::SeqCst);
        self.journal.push(format!("kill:{}", self.id));
        if let Some(hook) = &self.on_kill {
            hook();
        }
    }
}

/// Disconnector that journals calls and can be slow or failing.
pub struct RecordingDisconnector {
    journal: Journal,
    delay: Duration,
    fail: bool,
    calls: AtomicUsize,
}

impl RecordingDisconnector {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            delay: Duration::ZERO,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PeerDisconnector for RecordingDisconnector {
    async fn disconnect(&self, peer: &str) -> Result<(), DisconnectError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.journal.push(format!("disconnect:{peer}"));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.journal.push(format!("disconnected:{peer}"));

        if self.fail {
            Err(DisconnectError::Transport {
                peer: peer.to_owned(),
                error: "radio busy".to_owned(),
            })
        } else {
            Ok(())
        }
    }
}

/// Bounds every wait in the tests.
pub const WAIT: Duration = Duration::from_secs(5);

/// Waits for the first event of `kind` about `action` (any action if `None`).
pub async fn wait_for(
    rx: &mut broadcast::Receiver<Event>,
    kind: EventKind,
    action: Option<&str>,
) -> Event {
    let fut = async {
        loop {
            match rx.recv().await {
                Ok(ev) if ev.kind == kind && (action.is_none() || ev.action.as_deref() == action) => {
                    return ev;
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("bus closed while waiting for {kind:?}"),
            }
        }
    };
    tokio::time::timeout(WAIT, fut)
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {kind:?} {action:?}"))
}

/// Waits until `action` has been killed at least once.
pub async fn wait_killed(action: &MockAction) {
    tokio::time::timeout(WAIT, async {
        while action.kills() == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("action {} was never killed", action.id()));
}

/// Lets spawned tasks on a current-thread runtime make progress.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
