use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::adapter::ExtractionEngine;

pub mod routes;

/// Server state
pub struct AppState {
    pub engine: ExtractionEngine,
}

pub fn router(engine: ExtractionEngine) -> Router {
    let state = Arc::new(AppState { engine });

    Router::new()
        .route("/extract", post(routes::handle_extract))
        .route("/health", get(routes::handle_health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(port: u16, engine: ExtractionEngine) -> anyhow::Result<()> {
    let app = router(engine);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
