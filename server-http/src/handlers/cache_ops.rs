use crate::models::{GetResponse, PutRequest, PutResponse};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use tracing::info;

/// PUT /cache/:key
pub async fn put_value(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<PutRequest>,
) -> Json<PutResponse> {
    info!("PUT: key={}", key);

    state.store.put(key, Bytes::from(req.value)).await;
    Json(PutResponse { ok: true })
}

/// GET /cache/:key
pub async fn get_value(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>, StatusCode> {
    info!("GET: key={}", key);

    let value = state.store.get(&key).await.ok_or(StatusCode::NOT_FOUND)?;
    let value = String::from_utf8(value.to_vec()).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(GetResponse { found: true, value }))
}
