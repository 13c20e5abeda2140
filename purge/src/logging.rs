use crate::ports::Logger;
use serde_json::Value;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Mutex;
use tracing::Level;

/// A leveled message with an optional structured payload
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub message: String,
    pub payload: Option<Value>,
}

impl LogRecord {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Logger adapter that forwards records to the global `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, record: LogRecord) {
        let payload = record.payload.as_ref().map(Value::to_string);
        let payload = payload.as_deref();
        let message = record.message;

        match level {
            Level::ERROR => tracing::error!(payload, "{}", message),
            Level::WARN => tracing::warn!(payload, "{}", message),
            Level::INFO => tracing::info!(payload, "{}", message),
            Level::DEBUG => tracing::debug!(payload, "{}", message),
            Level::TRACE => tracing::trace!(payload, "{}", message),
        }
    }
}

/// Logger adapter that keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<(Level, LogRecord)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<(Level, LogRecord)> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn at(&self, level: Level) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, record)| record)
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: Level, record: LogRecord) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((level, record));
    }
}

/// Run a logging call, absorbing any panic raised by the logger.
pub(crate) fn best_effort<F: FnOnce()>(log: F) {
    let _ = catch_unwind(AssertUnwindSafe(log));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_logger_filters_by_level() {
        let logger = MemoryLogger::new();
        logger.debug(LogRecord::new("one"));
        logger.error(LogRecord::new("two").with_payload(json!({"kind": "store"})));
        logger.debug(LogRecord::new("three"));

        let debug: Vec<_> = logger.at(Level::DEBUG).into_iter().map(|r| r.message).collect();
        assert_eq!(debug, vec!["one", "three"]);

        let errors = logger.at(Level::ERROR);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].payload, Some(json!({"kind": "store"})));
    }

    #[test]
    fn best_effort_swallows_panics() {
        let mut reached = false;
        best_effort(|| panic!("sink is gone"));
        best_effort(|| reached = true);
        assert!(reached);
    }
}
