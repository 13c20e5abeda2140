use axum::{
    body::{self, Body},
    extract::ConnectInfo,
    http::{Method, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use purge::MemoryLogger;
use serde_json::{json, Value};
use server_http::models::AckResponse;
use server_http::{build_router, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use storage_engine::MokaCache;
use tower::ServiceExt;
use tracing::Level;

struct Harness {
    router: Router,
    store: Arc<MokaCache>,
    logger: Arc<MemoryLogger>,
}

fn harness() -> Harness {
    let store = Arc::new(MokaCache::new("test", None, None));
    let logger = Arc::new(MemoryLogger::new());
    let state = AppState::new(store.clone(), logger.clone());

    Harness {
        router: build_router(state),
        store,
        logger,
    }
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let mut request = builder.body(body).unwrap();
    let peer: SocketAddr = "10.0.0.2:40000".parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_check_reports_ok() {
    let h = harness();

    let response = h
        .router
        .oneshot(request(Method::GET, "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"message": "OK"}));
}

#[tokio::test]
async fn trailing_slash_is_routed_but_logged_as_received() {
    let h = harness();

    let response = h
        .router
        .oneshot(request(Method::GET, "/health/?x=1", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"message": "OK"}));

    let info = h.logger.at(Level::INFO);
    assert_eq!(info.len(), 1);
    assert_eq!(info[0].message, "GET /health/?x=1 from IP 10.0.0.2");
}

#[tokio::test]
async fn unreadable_body_is_forwarded_as_empty() {
    let h = harness();

    let failing = futures::stream::iter(vec![Err::<Bytes, _>(std::io::Error::other(
        "connection reset",
    ))]);
    let mut request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .body(Body::from_stream(failing))
        .unwrap();
    let peer: SocketAddr = "10.0.0.2:40000".parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));

    let response = h.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let info = h.logger.at(Level::INFO);
    assert_eq!(info[0].message, "GET /health from IP 10.0.0.2");

    let debug = h.logger.at(Level::DEBUG);
    assert_eq!(debug[0].message, "The request payload was");
    assert_eq!(debug[0].payload, Some(json!({})));
}

#[tokio::test]
async fn every_request_is_logged_before_routing() {
    let h = harness();

    let response = h
        .router
        .oneshot(request(Method::GET, "/items?id=5", Some(json!({}))))
        .await
        .unwrap();

    // Unrouted, but still observed and passed downstream
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let info = h.logger.at(Level::INFO);
    assert_eq!(info.len(), 1);
    assert_eq!(info[0].message, "GET /items?id=5 from IP 10.0.0.2");

    let debug = h.logger.at(Level::DEBUG);
    assert_eq!(debug[0].message, "The request payload was");
    assert_eq!(debug[0].payload, Some(json!({})));
}

#[tokio::test]
async fn logged_body_still_reaches_the_handler() {
    let h = harness();

    let response = h
        .router
        .clone()
        .oneshot(request(
            Method::PUT,
            "/cache/greeting",
            Some(json!({"value": "hello"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        h.store.get("greeting").await,
        Some(Bytes::from_static(b"hello"))
    );

    let debug = h.logger.at(Level::DEBUG);
    assert_eq!(debug[0].payload, Some(json!({"value": "hello"})));

    let response = h
        .router
        .oneshot(request(Method::GET, "/cache/greeting", None))
        .await
        .unwrap();
    assert_eq!(
        json_body(response).await,
        json!({"found": true, "value": "hello"})
    );
}

#[tokio::test]
async fn missing_key_is_not_found() {
    let h = harness();

    let response = h
        .router
        .oneshot(request(Method::GET, "/cache/absent", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_keys_event_returns_acknowledged_count() {
    let h = harness();
    h.store.put("a".into(), Bytes::from_static(b"1")).await;
    h.store.put("b".into(), Bytes::from_static(b"2")).await;

    let response = h
        .router
        .oneshot(request(
            Method::POST,
            "/events/cacheDeleteKeys",
            Some(json!({"keys": ["a", "b", "c"]})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let ack: AckResponse = serde_json::from_value(json_body(response).await).unwrap();
    assert!(ack.error.is_none());
    assert_eq!(ack.result, Some(json!(2)));
    assert!(h.store.get("a").await.is_none());
}

#[tokio::test]
async fn empty_key_list_acknowledges_zero() {
    let h = harness();

    let response = h
        .router
        .oneshot(request(
            Method::POST,
            "/events/cacheDeleteKeys",
            Some(json!({"keys": []})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"error": null, "result": 0})
    );
    assert!(h.logger.at(Level::ERROR).is_empty());
}

#[tokio::test]
async fn unknown_event_is_rejected() {
    let h = harness();

    let response = h
        .router
        .oneshot(request(Method::POST, "/events/cacheFlush", Some(json!({}))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let ack: AckResponse = serde_json::from_value(json_body(response).await).unwrap();
    let error = ack.error.unwrap();
    assert_eq!(error.kind, "unknown_event");
    assert!(ack.result.is_none());
}

#[tokio::test]
async fn malformed_payload_is_rejected() {
    let h = harness();

    let response = h
        .router
        .oneshot(request(
            Method::POST,
            "/events/cacheDeleteKeys",
            Some(json!({"keys": 42})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let ack: AckResponse = serde_json::from_value(json_body(response).await).unwrap();
    assert_eq!(ack.error.unwrap().kind, "invalid_payload");
}
