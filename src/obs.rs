//! obs-websocket implementation of the event-source capability
//!
//! The only module that knows `obws` types. One `open` call performs the
//! transport connect, the identify handshake, and the event subscription,
//! scoped to `InputActiveStateChanged` to keep event volume down.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use obws::client::ConnectConfig;
use obws::events::Event;
use obws::requests::EventSubscription;
use obws::responses::StatusCode;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info, trace};

use crate::source::{ActivityEvent, EventSource, SourceError, SourceSession};

/// Capacity of the client-internal event broadcast channel.
const EVENT_CAPACITY: usize = 128;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// An obs-websocket endpoint to open sessions against.
pub struct ObsSource {
    host: String,
    port: u16,
    password: Option<String>,
}

impl ObsSource {
    pub fn new(host: String, port: u16, password: Option<String>) -> Self {
        Self {
            host,
            port,
            password,
        }
    }

    fn endpoint(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }

    fn transport_error(&self, err: impl std::fmt::Display) -> SourceError {
        SourceError::Transport {
            endpoint: self.endpoint(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl EventSource for ObsSource {
    async fn open(&self) -> Result<Box<dyn SourceSession>, SourceError> {
        info!("🎬 Connecting to OBS at {}:{}", self.host, self.port);

        let client = obws::Client::connect_with_config(ConnectConfig {
            host: self.host.clone(),
            port: self.port,
            password: self.password.clone(),
            event_subscriptions: Some(EventSubscription::INPUT_ACTIVE_STATE_CHANGED),
            broadcast_capacity: Some(EVENT_CAPACITY),
        })
        .await
        .map_err(|e| match e {
            // A failed handshake means the endpoint is there but rejected
            // us (bad credential); retrying that forever is pointless.
            obws::Error::Handshake(e) => SourceError::Other(e.into()),
            other => self.transport_error(other),
        })?;

        let events = client.events().map_err(|e| self.transport_error(e))?;

        info!("✅ OBS WebSocket connected and identified");
        Ok(Box::new(ObsSession {
            client,
            events: Box::pin(events),
        }))
    }
}

/// An identified obs-websocket session.
struct ObsSession {
    client: obws::Client,
    events: Pin<Box<dyn Stream<Item = Event> + Send>>,
}

#[async_trait]
impl SourceSession for ObsSession {
    async fn source_active(&mut self, source: &str) -> Result<bool, SourceError> {
        let state = self
            .client
            .sources()
            .active(source)
            .await
            .map_err(|e| classify(source, e))?;
        trace!("GetSourceActive '{}' -> {}", source, state.active);
        Ok(state.active)
    }

    async fn next_event(&mut self) -> Option<ActivityEvent> {
        while let Some(event) = self.events.next().await {
            match event {
                Event::InputActiveStateChanged { name, active } => {
                    debug!("InputActiveStateChanged '{}' active={}", name, active);
                    return Some(ActivityEvent {
                        source: name,
                        active,
                    });
                }
                other => trace!("ignoring OBS event: {:?}", other),
            }
        }
        None
    }
}

/// Map an `obws` request failure onto the engine's error taxonomy.
fn classify(source: &str, err: obws::Error) -> SourceError {
    use obws::Error;
    match err {
        Error::Disconnected => SourceError::NotIdentified,
        Error::Api {
            code: StatusCode::ResourceNotFound,
            ..
        } => SourceError::UnknownSource(source.to_string()),
        // A response that does not decode into the expected shape is
        // treated like a missing source: skip it, keep its previous state.
        Error::DeserializeResponse(_) => SourceError::UnknownSource(source.to_string()),
        other => SourceError::Other(other.into()),
    }
}
