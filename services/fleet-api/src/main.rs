use axum::{
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing::info;

mod config;
mod handlers;
mod scheduler;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    skymed_domain::logging::init();

    let config = Config::from_env()?;
    let state = Arc::new(AppState::new(config.clone())?);

    if config.scheduler_enabled {
        scheduler::spawn(state.clone());
    }

    let app = Router::new()
        .route("/health", get(health_check))
        .route(
            "/drones",
            get(handlers::list_drones).post(handlers::register_drone),
        )
        .route("/drones/:drone_id", get(handlers::get_drone))
        .route("/drones/:drone_id/state", put(handlers::update_drone_state))
        .route(
            "/drones/:drone_id/medications",
            post(handlers::load_medications),
        )
        .route("/drones/:drone_id/fail", post(handlers::mark_failed))
        .route(
            "/medications",
            get(handlers::list_medications).post(handlers::add_medication),
        )
        .route("/drain-tick", post(handlers::drain_tick))
        .route("/report", get(handlers::fleet_report))
        .route("/battery-logs", get(handlers::battery_logs))
        .route("/error-logs", get(handlers::error_logs))
        .with_state(state)
        .layer(ServiceBuilder::new().into_inner());

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Fleet API listening on {}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_check() -> axum::response::Json<Value> {
    axum::response::Json(json!({
        "status": "healthy",
        "service": "fleet-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
