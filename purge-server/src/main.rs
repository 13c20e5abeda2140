use purge::{EventDispatcher, Logger, TracingLogger};
use shared::config::Config;
use std::net::SocketAddr;
use std::sync::Arc;
use storage_engine::MokaCache;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables before anything reads them
    let dotenv = dotenvy::dotenv();

    let config = Arc::new(Config::from_env());

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Purge Server");

    match dotenv {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    // ============================================
    // STEP 1: Initialize cache store and event core
    // ============================================
    let store = Arc::new(MokaCache::new(
        "purge",
        config.cache_max_entries,
        config.cache_ttl,
    ));
    info!("Cache store initialized: {:?}", store);

    let logger: Arc<dyn Logger> = Arc::new(TracingLogger);
    let dispatcher = Arc::new(EventDispatcher::with_defaults(store.clone(), logger.clone()));

    // ============================================
    // STEP 2: Bind listeners
    // ============================================
    let http_listener = TcpListener::bind(config.http_addr()).await?;
    let tcp_listener = TcpListener::bind(config.tcp_addr()).await?;

    // ============================================
    // STEP 3: Spawn HTTP Server Task
    // ============================================
    let app_state = server_http::AppState::with_dispatcher(store, dispatcher.clone(), logger);
    let http_router = server_http::build_router(app_state);

    info!("HTTP Server listening on http://{}", config.http_addr());
    let http_handle = tokio::spawn(async move {
        axum::serve(
            http_listener,
            http_router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
    });

    // ============================================
    // STEP 4: Spawn TCP Event Bus Task
    // ============================================
    info!("TCP event bus listening on tcp://{}", config.tcp_addr());
    let tcp_handle = tokio::spawn(server_tcp::serve(tcp_listener, dispatcher));

    // ============================================
    // STEP 5: Wait for shutdown signal
    // ============================================
    tokio::select! {
        result = http_handle => match result {
            Ok(Ok(())) => info!("HTTP server task completed"),
            Ok(Err(e)) => tracing::error!("HTTP server error: {}", e),
            Err(e) => tracing::error!("HTTP server task failed: {}", e),
        },
        _ = tcp_handle => info!("TCP server task completed"),
        _ = shutdown_signal() => info!("Shutdown signal received"),
    }

    info!("Purge server shutting down");
    Ok(())
}

// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}
