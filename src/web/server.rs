//! Axum web server setup

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::bridge::actor::BridgeHandle;

use super::handlers::{self, AppState};

/// Routes under `/api`, wired to a running bridge
pub fn router(bridge: BridgeHandle) -> Router {
    let app_state = Arc::new(AppState { bridge });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/panel/events", post(handlers::post_panel_event))
        .route("/objects", get(handlers::list_objects))
        .route("/objects/{*path}", post(handlers::post_object_command))
        .route("/state", get(handlers::get_state))
        .with_state(app_state);

    Router::new().nest("/api", api_routes).layer(cors)
}

/// Start the web server
pub async fn start_server(bridge: BridgeHandle, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let app = router(bridge);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://localhost:{}", port);
    axum::serve(listener, app).await?;

    Ok(())
}
