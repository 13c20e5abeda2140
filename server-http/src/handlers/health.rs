use crate::models::HealthResponse;
use axum::{http::StatusCode, Json};

/// GET /health
pub async fn health_check() -> Result<Json<HealthResponse>, StatusCode> {
    Ok(Json(HealthResponse {
        message: "OK".into(),
    }))
}

/// Fallback for unrouted paths
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
