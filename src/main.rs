//! Travel chat - conversational front-end for a travel booking backend
//!
//! Each user message runs through two remote stages: the NLU service
//! resolves an intent, then the command service executes it. Sessions
//! keep an append-only transcript and reject input while a run is busy.

mod api;
mod backend;
mod config;
mod conversation;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use backend::BackendClient;
use config::ChatConfig;
use runtime::{HttpCommandExecutor, HttpIntentResolver, SessionManager};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "travel_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = ChatConfig::from_env();

    let client = Arc::new(BackendClient::new(&config.backend)?);
    tracing::info!(
        backend = %client.base_url(),
        timeout_secs = config.backend.timeout.as_secs(),
        "Backend client initialized"
    );

    let sessions = SessionManager::new(
        Arc::new(HttpIntentResolver::new(Arc::clone(&client))),
        Arc::new(HttpCommandExecutor::new(client)),
        config.greeting,
    );
    let state = AppState::new(sessions);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Travel chat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
