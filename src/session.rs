//! Session lifecycle against the remote event source
//!
//! Owns connect/identify/subscribe, the reconciliation pull, push-event
//! application, and liveness tracking. Every failure decision is gated on
//! daemon mode: resilient when unattended, fail-fast interactively.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::bindings::SourceBindings;
use crate::projector::OutputProjector;
use crate::source::{ActivityEvent, EventSource, SourceError, SourceSession};
use crate::store::ActivityStore;

/// A session whose last push or pull is older than this may have a dead
/// subscription even though the transport still looks alive.
pub const STALE_AFTER: Duration = Duration::from_secs(30);

pub struct SessionManager {
    source: Box<dyn EventSource>,
    bindings: Arc<SourceBindings>,
    daemon: bool,
    session: Option<Box<dyn SourceSession>>,
    /// Instant of the last successful push or pull.
    last_activity: Instant,
    stale_after: Duration,
}

impl SessionManager {
    pub fn new(source: Box<dyn EventSource>, bindings: Arc<SourceBindings>, daemon: bool) -> Self {
        Self {
            source,
            bindings,
            daemon,
            session: None,
            last_activity: Instant::now(),
            stale_after: STALE_AFTER,
        }
    }

    /// Whether a live, identified session exists.
    pub fn is_identified(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the session has gone quiet past the staleness threshold.
    pub fn is_stale(&self) -> bool {
        self.last_activity.elapsed() > self.stale_after
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Establish a session: connect, identify, subscribe, then pull the full
    /// state before the session is considered ready.
    ///
    /// An unreachable endpoint leaves the manager disconnected for the next
    /// cycle in daemon mode and is fatal otherwise. Identification failures
    /// are fatal in both modes.
    pub async fn establish(
        &mut self,
        store: &mut ActivityStore,
        projector: &mut OutputProjector,
    ) -> Result<(), SourceError> {
        match self.source.open().await {
            Ok(session) => {
                self.session = Some(session);
                self.check_state(store, projector).await
            }
            Err(SourceError::Transport { endpoint, reason }) if self.daemon => {
                debug!("cannot reach {} ({}), staying disconnected", endpoint, reason);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Reconciliation pull: query every bound source independently, fold the
    /// answers into the store, and project unconditionally afterwards.
    ///
    /// Per-source failure policy: unknown or malformed sources keep their
    /// previous state; a dropped session is absorbed in daemon mode (the
    /// next cycle reconnects); anything else is logged and skipped in daemon
    /// mode and fatal otherwise.
    pub async fn check_state(
        &mut self,
        store: &mut ActivityStore,
        projector: &mut OutputProjector,
    ) -> Result<(), SourceError> {
        self.touch();
        debug!("reconciling activity for {} sources", self.bindings.len());

        let mut fresh: HashMap<String, bool> = HashMap::new();
        let mut lost = false;
        if let Some(session) = self.session.as_mut() {
            for name in self.bindings.source_names() {
                match session.source_active(name).await {
                    Ok(active) => {
                        fresh.insert(name.to_string(), active);
                    }
                    Err(SourceError::NotIdentified) => {
                        // A concurrent disconnect is in flight.
                        if !self.daemon {
                            return Err(SourceError::NotIdentified);
                        }
                        lost = true;
                    }
                    Err(SourceError::UnknownSource(_)) => {
                        debug!("source '{}' not found, keeping previous state", name);
                    }
                    Err(e) => {
                        if !self.daemon {
                            return Err(e);
                        }
                        warn!("query for '{}' failed: {}", name, e);
                    }
                }
            }
        }
        if lost {
            warn!("session dropped mid-reconciliation");
            self.session = None;
        }

        store.set_all(&fresh);
        projector.project(store.snapshot());
        Ok(())
    }

    /// Apply a pushed activity change and project immediately.
    /// Unbound source names are dropped without error.
    pub fn apply_event(
        &mut self,
        event: ActivityEvent,
        store: &mut ActivityStore,
        projector: &mut OutputProjector,
    ) {
        // Any push proves the subscription is alive, bound or not.
        self.touch();
        if !self.bindings.contains(&event.source) {
            debug!("ignoring activity change for unbound source '{}'", event.source);
            return;
        }
        debug!("activity change: '{}' active={}", event.source, event.active);
        store.set(&event.source, event.active);
        projector.project(store.snapshot());
    }

    /// Wait for the next pushed event.
    ///
    /// Returns `None` when the connection has closed; the session is
    /// dropped so the next cycle reconnects.
    pub async fn recv_event(&mut self) -> Option<ActivityEvent> {
        let session = self.session.as_mut()?;
        match session.next_event().await {
            Some(event) => Some(event),
            None => {
                warn!("🔌 event stream closed");
                self.session = None;
                None
            }
        }
    }
}
