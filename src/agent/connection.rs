//! # Connection agent handed to a peer action.
//!
//! A [`ConnectionAgent`] is the transport-facing description of one pooled
//! PSK-TLS client: reuse/keep-alive settings, socket limits, cipher list and
//! the credential pair. The action's HTTP layer builds its sockets from it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Pre-shared-key credential identifying a connection to one peer.
#[derive(Clone, PartialEq, Eq)]
pub struct PskCredential {
    identity: Arc<str>,
    key: Arc<[u8]>,
}

impl PskCredential {
    /// Creates a credential from an identity and secret.
    pub fn new(identity: impl Into<Arc<str>>, key: impl Into<Arc<[u8]>>) -> Self {
        Self {
            identity: identity.into(),
            key: key.into(),
        }
    }

    /// The PSK identity sent in the handshake.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The PSK secret.
    pub fn key(&self) -> &[u8] {
        &self.key
    }
}

impl fmt::Debug for PskCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PskCredential")
            .field("identity", &self.identity)
            .field("key", &format_args!("<{} bytes redacted>", self.key.len()))
            .finish()
    }
}

/// Pooling options resolved from [`AgentConfig`](crate::AgentConfig).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentOptions {
    /// Reuse persistent connections.
    pub keep_alive: bool,
    /// Keep-alive probe interval, if enabled.
    pub keep_alive_interval: Option<Duration>,
    /// Total socket limit (`None` = unlimited).
    pub max_sockets: Option<usize>,
    /// Idle socket cache size.
    pub max_free_sockets: usize,
    /// Offered cipher suites.
    pub ciphers: &'static [&'static str],
}

/// Transport agent configured for one PSK credential.
#[derive(Clone, Debug)]
pub struct ConnectionAgent {
    options: Arc<AgentOptions>,
    credential: PskCredential,
}

impl ConnectionAgent {
    pub(crate) fn new(options: Arc<AgentOptions>, credential: PskCredential) -> Self {
        Self {
            options,
            credential,
        }
    }

    /// Pooling options.
    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    /// Credential used for every connection this agent opens.
    pub fn credential(&self) -> &PskCredential {
        &self.credential
    }
}
