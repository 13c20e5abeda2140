use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event name for bulk cache key deletion
pub const CACHE_DELETE_KEYS: &str = "cacheDeleteKeys";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheDeleteKeysPayload {
    pub keys: Vec<String>,
}

impl CacheDeleteKeysPayload {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

/// A named event with its still-undecoded payload, as carried by the transports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event: String,
    #[serde(default)]
    pub payload: Value,
}

impl EventEnvelope {
    pub fn new(event: impl Into<String>, payload: Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }
}
