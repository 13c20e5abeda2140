use crate::models::AckResponse;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use purge::{Ack, EventEnvelope};
use serde_json::Value;
use shared::Error;

/// POST /events/:event
///
/// Dispatches the body as the event's payload and answers with its acknowledgment.
pub async fn emit_event(
    State(state): State<AppState>,
    Path(event): Path<String>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<AckResponse>) {
    let (ack, outcome) = Ack::channel();
    state
        .dispatcher
        .dispatch(EventEnvelope::new(event, payload), Some(ack));

    match outcome.await {
        Ok(Ok(result)) => (StatusCode::OK, Json(AckResponse::ok(result))),
        Ok(Err(err)) => (status_for(&err), Json(AckResponse::err(&err))),
        Err(_) => {
            let err = Error::Internal("acknowledgment dropped".into());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(AckResponse::err(&err)))
        }
    }
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Cache(_) => StatusCode::BAD_GATEWAY,
        Error::UnknownEvent(_) | Error::InvalidPayload(_) => StatusCode::BAD_REQUEST,
        Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
