//! Top-level synchronization loop
//!
//! One cooperative cycle: make sure a session exists, wait for pushed
//! events, reconcile when the session goes quiet, and blank the lights
//! while disconnected. Runs until the process is terminated.

use std::time::Duration;

use anyhow::Result;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::projector::OutputProjector;
use crate::session::SessionManager;
use crate::store::ActivityStore;

/// How long one cycle waits for pushed events before considering a forced
/// reconciliation.
const POLL_INTERVAL: Duration = Duration::from_secs(16);
/// Pause between reconnect attempts while disconnected.
const RETRY_BACKOFF: Duration = Duration::from_secs(4);

pub struct SyncLoop {
    session: SessionManager,
    store: ActivityStore,
    projector: OutputProjector,
}

impl SyncLoop {
    pub fn new(session: SessionManager, store: ActivityStore, projector: OutputProjector) -> Self {
        Self {
            session,
            store,
            projector,
        }
    }

    /// Run forever. Returns only when a failure is fatal for the current
    /// operating mode, which never happens in daemon mode.
    pub async fn run(&mut self) -> Result<()> {
        info!("sync loop started");
        loop {
            if !self.session.is_identified() {
                self.session
                    .establish(&mut self.store, &mut self.projector)
                    .await?;
            }

            if self.session.is_identified() {
                match timeout(POLL_INTERVAL, self.session.recv_event()).await {
                    Ok(Some(event)) => {
                        self.session
                            .apply_event(event, &mut self.store, &mut self.projector)
                    }
                    // Stream closed; the next cycle reconnects.
                    Ok(None) => {}
                    Err(_elapsed) => {
                        if self.session.is_stale() {
                            debug!("session quiet past the staleness threshold, forcing reconciliation");
                            self.session
                                .check_state(&mut self.store, &mut self.projector)
                                .await?;
                        }
                    }
                }
            } else {
                self.blackout();
                tokio::time::sleep(RETRY_BACKOFF).await;
            }
        }
    }

    /// Turn every output off.
    pub fn blackout(&mut self) {
        self.store.clear_all();
        self.projector.project(self.store.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::SourceBindings;
    use crate::config::Assignment;
    use crate::outputs::testing::RecordingOutput;
    use crate::source::fake::FakeSource;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_blackout_turns_everything_off() {
        let bindings = Arc::new(SourceBindings::new(&[
            Assignment {
                pin: 17,
                source: "Camera 1".to_string(),
            },
            Assignment {
                pin: 22,
                source: "Camera 2".to_string(),
            },
        ]));
        let (output, writes) = RecordingOutput::new();
        let projector =
            OutputProjector::new(Box::new(output), Arc::clone(&bindings)).unwrap();
        let mut store = ActivityStore::new(Arc::clone(&bindings));
        store.set("Camera 1", true);
        let session = SessionManager::new(
            Box::new(FakeSource::with_events(&[])),
            bindings,
            true,
        );

        let mut sync = SyncLoop::new(session, store, projector);
        sync.projector.project(sync.store.snapshot());
        writes.lock().unwrap().clear();

        sync.blackout();

        assert_eq!(*writes.lock().unwrap(), vec![(17, false)]);
        assert!(!sync.store.is_active("Camera 1"));
        assert!(!sync.store.is_active("Camera 2"));
    }
}
