//! Error types used by the peerpool runtime and peer actions.
//!
//! This module defines three error enums:
//!
//! - [`PoolError`] — errors raised by the pool itself (state machine, bookkeeping).
//! - [`ActionError`] — errors raised by a single peer action execution.
//! - [`DisconnectError`] — errors raised by a [`PeerDisconnector`](crate::PeerDisconnector).
//!
//! All types provide `as_label` for logging/metrics.

use thiserror::Error;

/// # Errors produced by the pool.
///
/// `AlreadyRunning` and `AlreadyStopped` are returned synchronously from
/// [`PeerActionPool::start`](crate::PeerActionPool::start) and
/// [`PeerActionPool::enqueue`](crate::PeerActionPool::enqueue).
/// `InvariantViolation` is never returned; it is logged and published as
/// [`EventKind::CounterInvariantViolated`](crate::EventKind::CounterInvariantViolated).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// `start()` was called while the pool is already running.
    #[error("pool is already running")]
    AlreadyRunning,

    /// `enqueue()` was called while the pool is stopped.
    #[error("enqueue called while pool is stopped")]
    AlreadyStopped,

    /// Replication count for a peer was observed outside `{0, 1, 2}`.
    #[error("replication count for peer {peer:?} is {count}, expected 0..=2")]
    InvariantViolation {
        /// Peer whose count is corrupt.
        peer: String,
        /// The observed count.
        count: u8,
    },
}

impl PoolError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use peerpool::PoolError;
    ///
    /// assert_eq!(PoolError::AlreadyStopped.as_label(), "pool_already_stopped");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PoolError::AlreadyRunning => "pool_already_running",
            PoolError::AlreadyStopped => "pool_already_stopped",
            PoolError::InvariantViolation { .. } => "pool_invariant_violation",
        }
    }
}

/// # Errors produced by a peer action's `start`.
///
/// The pool never propagates these to the caller of `enqueue`; they are logged,
/// published as `ActionFailed` and always followed by `kill`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The action ran and failed (transport error, bad response, ...).
    #[error("action failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The action's start future panicked.
    #[error("action panicked: {info}")]
    Panicked {
        /// Panic payload, if it was a string.
        info: String,
    },

    /// The action was killed before it could finish.
    #[error("action canceled")]
    Canceled,
}

impl ActionError {
    /// Shorthand for [`ActionError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        ActionError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ActionError::Fail { .. } => "action_failed",
            ActionError::Panicked { .. } => "action_panicked",
            ActionError::Canceled => "action_canceled",
        }
    }
}

/// # Errors produced while tearing down a peer connection.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisconnectError {
    /// The transport refused or failed the disconnect.
    #[error("disconnect from {peer:?} failed: {error}")]
    Transport {
        /// Peer the disconnect targeted.
        peer: String,
        /// The underlying error message.
        error: String,
    },
}

impl DisconnectError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DisconnectError::Transport { .. } => "disconnect_failed",
        }
    }
}
