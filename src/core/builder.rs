use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use super::{config::PoolConfig, pool::PeerActionPool};
use crate::{
    agent::AgentFactory,
    events::Bus,
    policies::{
        AdmissionPolicy, NoopDisconnector, ParallelPolicy, PeerDisconnector, PolicyContext,
        SerialPolicy,
    },
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`PeerActionPool`] with optional collaborators.
pub struct PoolBuilder {
    cfg: PoolConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    agents: Option<AgentFactory>,
    disconnector: Arc<dyn PeerDisconnector>,
}

impl PoolBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: PoolConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            agents: None,
            disconnector: Arc::new(NoopDisconnector),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive pool events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Overrides the agent factory (default: built from `PoolConfig::agent`).
    pub fn with_agent_factory(mut self, agents: AgentFactory) -> Self {
        self.agents = Some(agents);
        self
    }

    /// Sets the disconnector the serial lane uses between actions.
    ///
    /// Ignored on parallel mediums. Default: [`NoopDisconnector`].
    pub fn with_disconnector(mut self, disconnector: Arc<dyn PeerDisconnector>) -> Self {
        self.disconnector = disconnector;
        self
    }

    /// Builds the pool in the stopped state.
    ///
    /// Must be called from within a tokio runtime; actions and subscriber
    /// workers are spawned on it.
    pub fn build(self) -> Arc<PeerActionPool> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let listener_token = CancellationToken::new();
        let runtime = Handle::current();

        if !self.subscribers.is_empty() {
            let subs = SubscriberSet::new(self.subscribers, bus.clone());
            spawn_subscriber_listener(&runtime, &bus, subs, listener_token.clone());
        }

        let ctx = PolicyContext {
            bus: bus.clone(),
            agents: self
                .agents
                .unwrap_or_else(|| AgentFactory::new(&self.cfg.agent)),
            runtime,
        };
        let policy: Box<dyn AdmissionPolicy> = if self.cfg.medium.is_serialized() {
            Box::new(SerialPolicy::new(ctx, self.disconnector))
        } else {
            Box::new(ParallelPolicy::new(ctx))
        };

        Arc::new(PeerActionPool::new_internal(
            self.cfg,
            bus,
            policy,
            listener_token,
        ))
    }
}

/// Forwards bus events to the subscriber set until `token` is cancelled.
fn spawn_subscriber_listener(
    runtime: &Handle,
    bus: &Bus,
    subs: SubscriberSet,
    token: CancellationToken,
) {
    let mut rx = bus.subscribe();
    runtime.spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(ev) => subs.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
        subs.shutdown().await;
    });
}
