pub mod api;
pub mod config;
pub mod data_structures;
pub mod worker;

use crate::api::{build_router, AppState};
use crate::data_structures::{LoadedHoldings, ServeSettings, SharedData};
use etfwatch::api::HoldingsAnalyzer;
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::Mutex;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app_config = config::AppConfig::load()?;

    // Initialize tracing with node_name in all logs
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    // Set a global span with node_name for all subsequent logs
    let _span = tracing::info_span!("node", name = %app_config.node_name).entered();

    tracing::info!("Starting etfwatch-server");
    tracing::info!(
        ?app_config.environment,
        port = app_config.port,
        data_dir = %app_config.data_dir.display(),
        "Loaded configuration"
    );

    let initial = match HoldingsAnalyzer::load(&app_config.data_dir) {
        Ok(analyzer) => LoadedHoldings::new(analyzer),
        Err(e) => {
            tracing::warn!(error = %e, "Initial holdings load failed, starting empty");
            LoadedHoldings::default()
        }
    };
    tracing::info!(records = initial.analyzer.records().len(), "Initial holdings loaded");

    let shared_data: SharedData = Arc::new(Mutex::new(initial));
    let app_state = AppState {
        data: shared_data.clone(),
        settings: Arc::new(ServeSettings {
            data_dir: app_config.data_dir.clone(),
            page_size: app_config.page_size,
        }),
    };

    tracing::info!("Spawning background worker");
    tokio::spawn(worker::run(shared_data.clone(), app_config.clone()));

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .finish()
            .ok_or("invalid rate limit configuration")?,
    );

    let app = build_router(app_state)
        .layer(GovernorLayer::new(governor_conf))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], app_config.port));
    tracing::info!(%addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
