// shared/src/lib.rs

use serde::{Deserialize, Serialize};

/// Failures reported by a cache backend.
///
/// This is the closed set of kinds a `CacheStore` may surface. Anything a
/// backend cannot classify goes into `Store`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("{0}")]
    Connection(String),
    #[error("cache operation timed out")]
    Timeout,
    #[error("store error: {0}")]
    Store(String),
    #[error("cache unavailable")]
    Unavailable,
}

impl CacheError {
    pub fn kind(&self) -> &'static str {
        match self {
            CacheError::Connection(_) => "connection",
            CacheError::Timeout => "timeout",
            CacheError::Store(_) => "store",
            CacheError::Unavailable => "unavailable",
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("unknown event: {0}")]
    UnknownEvent(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl Error {
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Cache(e) => e.kind(),
            Error::UnknownEvent(_) => "unknown_event",
            Error::InvalidPayload(_) => "invalid_payload",
            Error::Internal(_) => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Structured rendering of an error: kind, message and the source chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl From<&Error> for ErrorReport {
    fn from(err: &Error) -> Self {
        let mut causes = Vec::new();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
            causes,
        }
    }
}

pub mod config;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_displays_bare_message() {
        let err = Error::from(CacheError::Connection("timeout".into()));
        assert_eq!(err.to_string(), "timeout");
        assert_eq!(err.kind(), "connection");
    }

    #[test]
    fn report_carries_kind_and_message() {
        let err = Error::UnknownEvent("cacheFlush".into());
        let report = ErrorReport::from(&err);
        assert_eq!(report.kind, "unknown_event");
        assert_eq!(report.message, "unknown event: cacheFlush");
        assert!(report.causes.is_empty());
    }
}
