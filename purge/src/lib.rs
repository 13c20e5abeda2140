#![deny(clippy::all)]

pub mod ack;
pub mod dispatch;
pub mod events;
pub mod handlers;
pub mod logging;
pub mod observer;
pub mod ports;

pub use ack::Ack;
pub use dispatch::{EventDispatcher, EventHandler};
pub use events::{CacheDeleteKeysPayload, EventEnvelope};
pub use handlers::CacheDeleteKeysHandler;
pub use logging::{LogRecord, MemoryLogger, TracingLogger};
pub use observer::{ObservedRequest, RequestObserver};
pub use ports::{CacheStore, Logger};
