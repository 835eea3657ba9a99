pub mod api;
pub mod config;
pub mod export;
pub mod logic;
pub mod model;
pub mod source;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use export::{export_csv, ExportCollection, ExportError, ExportFile};
pub use logic::{
    LoadAnalyzer, MergeOutcome, Resolver, RiderFilter, RosterEngine, RosterSummary, ShardMerger,
    SubmitError,
};

// Export all model types
pub use model::*;

pub use source::{HttpSourceClient, MemorySourceClient, SourceClient, SourceEndpoint, SourceFailure};
pub use store::{RosterStore, RosterView};

/// Boot the service from configuration and serve until the listener closes.
pub async fn run_server() -> anyhow::Result<()> {
    use axum::serve;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let config = crate::config::AppConfig::load()?;
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
        engine.reconcile().await;
    }

    let app = crate::api::routes::create_router().with_state(engine);
    let listener = TcpListener::bind(&config.server_address()).await?;

    serve(listener, app).await?;

    Ok(())
}
