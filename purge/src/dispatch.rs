use crate::ack::Ack;
use crate::events::{CACHE_DELETE_KEYS, EventEnvelope};
use crate::handlers::CacheDeleteKeysHandler;
use crate::ports::{CacheStore, Logger};
use async_trait::async_trait;
use serde_json::Value;
use shared::Error;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

/// A handler for one named event, fed the raw JSON payload
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn on_event(&self, payload: Value, ack: Option<Ack<Value>>);
}

/// Routes event envelopes to the handler registered under the event's name
#[derive(Clone, Default)]
pub struct EventDispatcher {
    handlers: HashMap<String, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher with every built-in event registered
    pub fn with_defaults(cache: Arc<dyn CacheStore>, logger: Arc<dyn Logger>) -> Self {
        Self::new().register(
            CACHE_DELETE_KEYS,
            Arc::new(CacheDeleteKeysHandler::new(cache, logger)),
        )
    }

    pub fn register(mut self, event: impl Into<String>, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.insert(event.into(), handler);
        self
    }

    pub fn handles(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    /// Hand the envelope to its handler on a fresh task and return immediately.
    ///
    /// Unknown events are acknowledged with [`Error::UnknownEvent`] right away and
    /// no task is spawned.
    pub fn dispatch(
        &self,
        envelope: EventEnvelope,
        ack: Option<Ack<Value>>,
    ) -> Option<JoinHandle<()>> {
        let EventEnvelope { event, payload } = envelope;

        let Some(handler) = self.handlers.get(&event).cloned() else {
            tracing::warn!("No handler registered for event \"{}\"", event);
            if let Some(ack) = ack {
                ack.resolve(Err(Error::UnknownEvent(event)));
            }
            return None;
        };

        let span = tracing::debug_span!("event", name = %event, id = %Uuid::new_v4());
        Some(tokio::spawn(
            async move { handler.on_event(payload, ack).await }.instrument(span),
        ))
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("events", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
