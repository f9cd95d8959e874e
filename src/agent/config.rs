//! # Connection agent configuration.
//!
//! ## Sentinel values
//! - `max_sockets = 0` → unlimited total sockets
//! - `transport_timeout = 0s` → keep-alive probes disabled (interval `None`)

use std::time::Duration;

/// PSK cipher suites offered by every agent.
pub const SUPPORTED_PSK_CIPHERS: &[&str] = &["PSK-AES256-CBC-SHA"];

/// Pooling parameters shared by every connection agent the pool creates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentConfig {
    /// Keep idle connections open for reuse.
    pub keep_alive: bool,

    /// Transport timeout; the keep-alive interval is half of it.
    pub transport_timeout: Duration,

    /// Maximum total sockets per agent (`0` = unlimited).
    pub max_sockets: usize,

    /// Maximum idle sockets kept for reuse.
    pub max_free_sockets: usize,

    /// Cipher suites offered during the PSK handshake.
    pub ciphers: &'static [&'static str],
}

impl AgentConfig {
    /// Returns the keep-alive probe interval, derived from the transport timeout.
    #[inline]
    pub fn keep_alive_interval(&self) -> Option<Duration> {
        if !self.keep_alive || self.transport_timeout.is_zero() {
            None
        } else {
            Some(self.transport_timeout / 2)
        }
    }

    /// Returns the total socket limit as an `Option` (`None` = unlimited).
    #[inline]
    pub fn socket_limit(&self) -> Option<usize> {
        match self.max_sockets {
            0 => None,
            n => Some(n),
        }
    }
}

impl Default for AgentConfig {
    /// Default configuration:
    ///
    /// - `keep_alive = true`
    /// - `transport_timeout = 10s` (keep-alive every 5s)
    /// - `max_sockets = 0` (unlimited)
    /// - `max_free_sockets = 256`
    /// - `ciphers = SUPPORTED_PSK_CIPHERS`
    fn default() -> Self {
        Self {
            keep_alive: true,
            transport_timeout: Duration::from_secs(10),
            max_sockets: 0,
            max_free_sockets: 256,
            ciphers: SUPPORTED_PSK_CIPHERS,
        }
    }
}
