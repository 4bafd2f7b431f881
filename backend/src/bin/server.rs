//! Store Monitor HTTP Server Binary
//!
//! Loads the three source tables, then serves the report API.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin store-monitor-server
//!
//! # Replay a historical dump, measuring windows from its newest poll
//! STORE_MONITOR_DATA_DIR=/data/dump REPORT_REFERENCE_TIME=latest_observation \
//!   cargo run --bin store-monitor-server
//! ```
//!
//! # Environment Variables
//!
//! - `STORE_MONITOR_CONFIG`: Path to a TOML config file
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `STORE_MONITOR_DATA_DIR`: Directory holding the CSV tables
//! - `REPORT_REFERENCE_TIME`: `now`, `latest_observation`, or an RFC 3339 instant
//! - `MAX_CONCURRENT_JOBS`: Report jobs allowed to compute at once
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use store_monitor::config::AppConfig;
use store_monitor::db;
use store_monitor::http::{create_router, AppState};
use store_monitor::services::ReportBuilder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Store Monitor HTTP Server");

    let config = AppConfig::load().context("Failed to load configuration")?;
    let clock = config.report.reference_clock()?;

    let tables = tokio::task::spawn_blocking({
        let data = config.data.clone();
        move || db::load_tables(&data)
    })
    .await?
    .context("Failed to load source tables")?;
    info!(
        stores = tables.catalog.store_count(),
        observations = tables.observations.len(),
        business_hours = tables.catalog.business_hours_len(),
        "Source tables loaded"
    );

    let builder = Arc::new(ReportBuilder::new(Arc::new(tables)).with_clock(clock));
    let state = AppState::new(builder, config.report.max_concurrent_jobs);
    let app = create_router(state);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address()))?;

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
