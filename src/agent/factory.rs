//! # Connection agent factory.
//!
//! Builds one [`ConnectionAgent`] per action invocation. Agents are not shared
//! across actions, so two actions never contend on one agent's sockets.
//!
//! TODO: cache agents per peer identifier so consecutive actions against the
//! same peer reuse warm connections.

use std::sync::Arc;

use crate::actions::PeerAction;
use crate::agent::config::AgentConfig;
use crate::agent::connection::{AgentOptions, ConnectionAgent, PskCredential};

/// Produces connection agents from a fixed [`AgentConfig`].
#[derive(Clone, Debug)]
pub struct AgentFactory {
    options: Arc<AgentOptions>,
}

impl AgentFactory {
    /// Resolves `cfg` once; every agent shares the resolved options.
    pub fn new(cfg: &AgentConfig) -> Self {
        Self {
            options: Arc::new(AgentOptions {
                keep_alive: cfg.keep_alive,
                keep_alive_interval: cfg.keep_alive_interval(),
                max_sockets: cfg.socket_limit(),
                max_free_sockets: cfg.max_free_sockets,
                ciphers: cfg.ciphers,
            }),
        }
    }

    /// Creates an agent for the given credential pair.
    pub fn create_agent(&self, psk_identity: &str, psk_key: &[u8]) -> ConnectionAgent {
        ConnectionAgent::new(
            Arc::clone(&self.options),
            PskCredential::new(psk_identity, psk_key),
        )
    }

    /// Creates an agent from the action's own credential.
    pub fn for_action(&self, action: &dyn PeerAction) -> ConnectionAgent {
        self.create_agent(action.psk_identity(), action.psk_key())
    }
}

impl Default for AgentFactory {
    fn default() -> Self {
        Self::new(&AgentConfig::default())
    }
}
