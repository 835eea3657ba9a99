use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::handlers;
use crate::logic::RosterEngine;
use crate::source::SourceClient;

pub fn create_router<C: SourceClient + 'static>() -> Router<Arc<RosterEngine<C>>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Reconciled roster
        .route("/snapshot", get(handlers::get_snapshot::<C>))
        .route("/reconcile", post(handlers::reconcile::<C>))
        .route("/summary", get(handlers::get_summary::<C>))
        .route("/load", get(handlers::list_load::<C>))
        // Lookups
        .route("/riders", get(handlers::list_riders::<C>))
        .route("/riders/:roll_no", get(handlers::get_rider::<C>))
        .route("/operators/:operator_id", get(handlers::get_operator::<C>))
        // Write-through to the record stores
        .route("/records/:kind", post(handlers::submit_record::<C>))
        .route("/records/:kind/:key", patch(handlers::update_record::<C>))
        // CSV export
        .route("/export/:collection", get(handlers::export_collection::<C>))
        .layer(CorsLayer::permissive())
}
