//! Remote event-source capability
//!
//! The sync engine talks to OBS through this narrow seam: open an identified
//! session, query per-source activity, receive pushed activity changes.
//! Keeping the seam small lets tests drive the whole session state machine
//! without a live OBS instance.

use async_trait::async_trait;
use thiserror::Error;

/// A pushed source-activity change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEvent {
    pub source: String,
    pub active: bool,
}

/// Failures surfaced by an event source, classified for retry policy.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The remote endpoint cannot be reached.
    #[error("cannot reach {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },

    /// The session was dropped between requests.
    #[error("session is no longer identified")]
    NotIdentified,

    /// The remote does not know the source, or answered with an unexpected
    /// shape for it. Callers keep the source's previous state.
    #[error("source '{0}' not known to the remote")]
    UnknownSource(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Capability to open identified sessions against the remote event source.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Connect, identify, and subscribe to source-activity events, all in
    /// one step. Only identified sessions are ever returned.
    async fn open(&self) -> Result<Box<dyn SourceSession>, SourceError>;
}

/// A live, identified session with the remote event source.
#[async_trait]
pub trait SourceSession: Send {
    /// Query whether a single source is currently active.
    async fn source_active(&mut self, source: &str) -> Result<bool, SourceError>;

    /// Wait for the next pushed activity change.
    ///
    /// Returns `None` once the underlying connection has closed; the
    /// session is unusable afterwards.
    async fn next_event(&mut self) -> Option<ActivityEvent>;
}
