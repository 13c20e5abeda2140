use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{Error, ErrorReport};

// === Cache Operation Models ===

#[derive(Deserialize)]
pub struct PutRequest {
    pub value: String,
}

#[derive(Serialize)]
pub struct PutResponse {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct GetResponse {
    pub found: bool,
    pub value: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: String,
}

// === Event Models ===

/// Wire form of an acknowledgment: exactly one of `error` / `result` is set
#[derive(Debug, Serialize, Deserialize)]
pub struct AckResponse {
    pub error: Option<ErrorReport>,
    pub result: Option<Value>,
}

impl AckResponse {
    pub fn ok(result: Value) -> Self {
        Self {
            error: None,
            result: Some(result),
        }
    }

    pub fn err(err: &Error) -> Self {
        Self {
            error: Some(ErrorReport::from(err)),
            result: None,
        }
    }
}
