use axum::serve;
use fleet_roster::api::routes::create_router;
use fleet_roster::config::AppConfig;
use fleet_roster::logic::RosterEngine;
use fleet_roster::source::HttpSourceClient;
use log::{info, warn};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    use env_logger::{Builder, Env};
    use log::LevelFilter;

    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("hyper", LevelFilter::Warn)
        .init();

    println!("Fleet Roster: reconciliation and load-analysis service");

    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: server={}:{}, {} record store(s)",
        config.server.host,
        config.server.port,
        config.sources.endpoint_count()
    );
    if config.sources.rider_shards.is_empty() {
        warn!("No rider shards configured; the roster will stay empty");
    }

    let client = HttpSourceClient::new(
        config.sources.request_timeout(),
        config.sources.auth_token.clone(),
    )?;
    let engine = Arc::new(RosterEngine::new(
        client,
        config.sources.clone(),
        config.analysis.clone(),
    ));

    if config.engine.reconcile_on_start {
        let snapshot = engine.reconcile().await;
        info!(
            "Initial roster: {} riders, {} warnings",
            snapshot.riders.len(),
            snapshot.warnings.len()
        );
    }

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    println!("Fleet Roster running on http://{}", bind_address);

    serve(listener, create_router().with_state(engine)).await?;

    Ok(())
}
