//! Runtime core: pool state machine, configuration and action execution.
//!
//! The public API from this module is [`PeerActionPool`] (with its
//! [`PoolBuilder`]) and the configuration types [`PoolConfig`] / [`Medium`].
//!
//! Internal modules:
//! - [`runner`]: executes one admitted action and kills it once it settles;
//! - [`pool`]: running flag, enqueue gate, policy routing;
//! - [`builder`]: wires bus, subscribers, agent factory and policy.

mod builder;
mod config;
mod pool;
pub(crate) mod runner;

pub use builder::PoolBuilder;
pub use config::{Medium, PoolConfig};
pub use pool::PeerActionPool;
