#![deny(clippy::all)]

use crate::logging::LogRecord;
use async_trait::async_trait;
use shared::CacheError;
use tracing::Level;

// Ports are the pluggable seams between the event core and its collaborators

/// Port for the cache backend (e.g. Moka)
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Remove every key in `keys`, returning how many entries were actually removed.
    async fn delete_keys(&self, keys: &[String]) -> Result<u64, CacheError>;
}

/// Port for leveled diagnostic output.
///
/// Calls are fire-and-forget: nothing is returned and callers never wait on delivery.
pub trait Logger: Send + Sync + 'static {
    fn log(&self, level: Level, record: LogRecord);

    fn debug(&self, record: LogRecord) {
        self.log(Level::DEBUG, record);
    }

    fn info(&self, record: LogRecord) {
        self.log(Level::INFO, record);
    }

    fn error(&self, record: LogRecord) {
        self.log(Level::ERROR, record);
    }
}
