// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::application::dashboard_service::DashboardService;
use crate::application::sensor_service::SensorService;
use crate::application::session::SessionStore;
use crate::infrastructure::cache::FetchCache;
use crate::infrastructure::config::{load_sensors_config, load_server_config};
use crate::infrastructure::http_source::HttpCsvSource;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{get_dashboard, health_check, list_sensors, login, logout};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let server_config = load_server_config()?;
    let sensors_config = load_sensors_config()?;

    // Create source and cache (infrastructure layer)
    let source = Arc::new(HttpCsvSource::new(sensors_config.columns.clone()));
    let cache = Arc::new(FetchCache::new(Duration::from_secs(
        server_config.cache.ttl_secs,
    )));

    // Create services (application layer)
    let sensor_service = SensorService::new(sensors_config.clone());
    let dashboard_service = DashboardService::new(source, cache, sensors_config);
    let sessions = SessionStore::new(server_config.auth.password.clone());

    // Create application state
    let state = Arc::new(AppState {
        sensor_service,
        dashboard_service,
        sessions,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/sensors", get(list_sensors))
        .route("/dashboards/:id", get(get_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = server_config.server.listen.parse()?;
    println!("Starting counter-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
