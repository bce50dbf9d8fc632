use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

mod api;
mod config;
mod coordinator;
mod sensor;
mod server;
mod teams;

use api::ScoreboardClient;
use config::Config;
use coordinator::UpdateCoordinator;
use sensor::TeamStatusSensor;
use server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    info!(
        "mlb-team-status {} starting for team {}",
        env!("CARGO_PKG_VERSION"),
        config.team_id.to_ascii_uppercase()
    );

    let fetcher = Arc::new(ScoreboardClient::new(Some(&config.api_url))?);
    let coordinator = UpdateCoordinator::new(config.coordinator_config(), fetcher)?;

    // Fetch initial data so subscribers have something to read
    coordinator.refresh().await;

    // Log each refresh outcome the way an entity would consume updates
    {
        let c = coordinator.clone();
        coordinator.subscribe(Arc::new(move || {
            if !c.last_success() {
                warn!(
                    "Refresh failed; serving last snapshot ({:?})",
                    c.freshness()
                );
                return;
            }
            if let Some(rec) = c.current_snapshot() {
                info!(
                    "{}: {} {} - {} {} [{}]",
                    rec.state.as_deref().unwrap_or("?"),
                    rec.team_abbr.as_deref().unwrap_or(c.team_id()),
                    rec.team_score.map_or_else(|| "-".to_string(), |s| s.to_string()),
                    rec.opponent_score.map_or_else(|| "-".to_string(), |s| s.to_string()),
                    rec.opponent_abbr.as_deref().unwrap_or("?"),
                    rec.quarter.as_deref().unwrap_or("no game"),
                );
            }
        }));
    }

    coordinator.start();

    // Status server exposing the sensor projection
    let sensor = TeamStatusSensor::new(coordinator.clone());
    let app = server::router(AppState { sensor });
    let addr: SocketAddr = config.server_addr.parse()?;
    info!("Status server listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    coordinator.dispose();
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
