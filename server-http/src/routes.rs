use crate::handlers;
use crate::middleware::request_logger;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;

/// Build and configure the application router
///
/// Paths are normalized before routing, so `/health/` reaches `/health`. The
/// request logger sits outside normalization and sees the URI as received.
pub fn build_router(state: AppState) -> Router {
    let observer = state.observer.clone();

    let routes = Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Event ingress
        .route("/events/{event}", post(handlers::emit_event))
        // Cache operation routes
        .route(
            "/cache/{key}",
            get(handlers::get_value).put(handlers::put_value),
        )
        .fallback(handlers::not_found)
        .with_state(state);

    Router::new()
        .fallback_service(NormalizePath::trim_trailing_slash(routes))
        // Middleware
        .layer(middleware::from_fn_with_state(observer, request_logger))
        .layer(TraceLayer::new_for_http())
}
