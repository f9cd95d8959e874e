//! Connection agents for PSK-TLS peer connections.
//!
//! ## Contents
//! - [`AgentConfig`] pooling parameters (keep-alive, socket limits, ciphers)
//! - [`AgentFactory`] one agent per action invocation
//! - [`ConnectionAgent`], [`AgentOptions`], [`PskCredential`] what the action receives

mod config;
mod connection;
mod factory;

pub use config::{AgentConfig, SUPPORTED_PSK_CIPHERS};
pub use connection::{AgentOptions, ConnectionAgent, PskCredential};
pub use factory::AgentFactory;
