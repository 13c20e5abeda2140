use crate::ack::Ack;
use crate::dispatch::EventHandler;
use crate::events::{CACHE_DELETE_KEYS, CacheDeleteKeysPayload};
use crate::logging::{LogRecord, best_effort};
use crate::ports::{CacheStore, Logger};
use async_trait::async_trait;
use serde_json::Value;
use shared::{Error, ErrorReport};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handles `cacheDeleteKeys`: bulk-deletes keys and acknowledges the outcome
#[derive(Clone)]
pub struct CacheDeleteKeysHandler {
    cache: Arc<dyn CacheStore>,
    logger: Arc<dyn Logger>,
}

impl CacheDeleteKeysHandler {
    pub fn new(cache: Arc<dyn CacheStore>, logger: Arc<dyn Logger>) -> Self {
        Self { cache, logger }
    }

    /// Start handling the event on the runtime and return without waiting.
    ///
    /// A panic raised by `ack` surfaces through the returned handle.
    pub fn handle(&self, payload: CacheDeleteKeysPayload, ack: Option<Ack<u64>>) -> JoinHandle<()> {
        let handler = self.clone();
        tokio::spawn(async move { handler.process(payload, ack).await })
    }

    /// Delete the payload's keys, then resolve `ack` once the cache has settled.
    pub async fn process(&self, payload: CacheDeleteKeysPayload, ack: Option<Ack<u64>>) {
        best_effort(|| {
            self.logger
                .debug(LogRecord::new(format!("Received event \"{}\"", CACHE_DELETE_KEYS)))
        });

        match self.cache.delete_keys(&payload.keys).await {
            Ok(deleted) => {
                if let Some(ack) = ack {
                    ack.resolve(Ok(deleted));
                }
            }
            Err(err) => {
                let err = Error::from(err);
                let report = serde_json::to_value(ErrorReport::from(&err)).unwrap_or_default();
                best_effort(|| {
                    self.logger
                        .error(LogRecord::new(err.to_string()).with_payload(report))
                });

                if let Some(ack) = ack {
                    ack.resolve(Err(err));
                }
            }
        }
    }
}

#[async_trait]
impl EventHandler for CacheDeleteKeysHandler {
    async fn on_event(&self, payload: Value, ack: Option<Ack<Value>>) {
        let payload = match serde_json::from_value::<CacheDeleteKeysPayload>(payload) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Rejected \"{}\" payload: {}", CACHE_DELETE_KEYS, e);
                if let Some(ack) = ack {
                    ack.resolve(Err(Error::InvalidPayload(e.to_string())));
                }
                return;
            }
        };

        self.process(payload, ack.map(|ack| ack.adapt(|deleted: u64| Value::from(deleted))))
            .await
    }
}

impl std::fmt::Debug for CacheDeleteKeysHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheDeleteKeysHandler").finish_non_exhaustive()
    }
}
