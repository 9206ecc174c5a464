//! Web server module

mod routes;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::Config;
use crate::db::Database;

/// Request bodies above this are rejected before any handler runs
const MAX_BODY_BYTES: usize = 10 * 1024;

pub struct AppState {
    pub db: Database,
}

pub fn app(db: Database) -> Router {
    let state = Arc::new(AppState { db });

    Router::new()
        .route("/", get(routes::index))
        .route("/script.js", get(routes::tracking_script))
        .route("/api/track", post(routes::api_track))
        .route(
            "/api/sites",
            get(routes::api_list_sites).post(routes::api_create_site),
        )
        .route("/api/sites/:id/stats", get(routes::api_site_stats))
        .route("/api/sites/:id/timeseries", get(routes::api_site_timeseries))
        .route("/api/sites/:id/pages", get(routes::api_site_pages))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        // The beacon is cross-origin by design and nothing here carries credentials
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: &Config, db: Database) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Web server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app(db).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
