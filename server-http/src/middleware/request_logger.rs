use axum::{
    body::{self, Body, Bytes},
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use purge::{ObservedRequest, RequestObserver};
use std::net::SocketAddr;

/// Request logging middleware
///
/// Buffers the body so it can be logged, then forwards the rebuilt request.
/// Every request is passed on, whatever happens while logging it.
pub async fn request_logger(
    State(observer): State<RequestObserver>,
    request: Request,
    next: Next,
) -> Response {
    let client_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let (parts, body) = request.into_parts();
    let body = match body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to buffer request body: {}", e);
            Bytes::new()
        }
    };

    let method = parts.method.to_string();
    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let observed = ObservedRequest {
        method: &method,
        path: &path,
        client_addr,
        body: &body,
    };

    let forwarded = body.clone();
    observer
        .observe(&observed, move || {
            next.run(Request::from_parts(parts, Body::from(forwarded)))
        })
        .await
}
