//! # Event subscribers for the pool.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] fan-out
//! used by the pool's subscriber listener.
//!
//! ## Architecture
//! ```text
//! Pool / policies / runner ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                                      ├──► LogWriter
//!                                                                      ├──► Metrics
//!                                                                      └──► Custom ...
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
