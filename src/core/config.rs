//! # Pool configuration.
//!
//! Provides [`PoolConfig`], the settings a [`PeerActionPool`](crate::PeerActionPool)
//! is built from, and [`Medium`], which selects the admission policy.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1

use std::fmt;

use crate::agent::AgentConfig;

/// Network medium the pool schedules actions over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Medium {
    /// Local WiFi: actions run in parallel.
    #[default]
    Wifi,
    /// Local ad-hoc wireless framework: actions run in parallel.
    LocalWireless,
    /// Bluetooth: one action at a time.
    Bluetooth,
}

impl Medium {
    /// Returns true if actions on this medium must run one at a time.
    #[inline]
    pub fn is_serialized(&self) -> bool {
        matches!(self, Medium::Bluetooth)
    }

    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Medium::Wifi => "wifi",
            Medium::LocalWireless => "local_wireless",
            Medium::Bluetooth => "bluetooth",
        }
    }
}

impl fmt::Display for Medium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Configuration for a peer action pool.
///
/// ## Field semantics
/// - `medium`: selects parallel or serialized admission
/// - `agent`: pooling parameters for every connection agent
/// - `bus_capacity`: event bus ring buffer size (min 1)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Medium the pool schedules over.
    pub medium: Medium,

    /// Connection agent parameters.
    pub agent: AgentConfig,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers lagging by more than this many events skip the oldest ones.
    pub bus_capacity: usize,
}

impl PoolConfig {
    /// Default configuration for `medium`.
    pub fn for_medium(medium: Medium) -> Self {
        Self {
            medium,
            ..Self::default()
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for PoolConfig {
    /// Default configuration:
    ///
    /// - `medium = Medium::Wifi`
    /// - `agent = AgentConfig::default()`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            medium: Medium::default(),
            agent: AgentConfig::default(),
            bus_capacity: 1024,
        }
    }
}
