use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    Json as RequestJson,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::export::{export_csv, ExportCollection, ExportFile};
use crate::logic::{RiderFilter, RosterEngine, RosterSummary};
use crate::model::{
    EnrichedOperator, EnrichedRider, EntityKind, LoadRecord, Operator, PendingRecord, RawRecord,
    Rider, Route, Tracked, Vehicle, Warning,
};
use crate::source::{parse_record, SourceClient};

pub type AppState<C> = Arc<RosterEngine<C>>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

/// Published snapshot with pending submissions merged into the entity lists,
/// each record tagged `confirmed` or `pending`.
#[derive(Debug, Serialize)]
pub struct SnapshotResponse<'a> {
    pub generation: u64,
    pub reconciled_at: Option<DateTime<Utc>>,
    pub riders: Vec<Tracked<'a, Rider>>,
    pub operators: Vec<Tracked<'a, Operator>>,
    pub vehicles: Vec<Tracked<'a, Vehicle>>,
    pub routes: &'a [Route],
    pub enriched_riders: &'a [EnrichedRider],
    pub enriched_operators: &'a [EnrichedOperator],
    pub load_records: &'a [LoadRecord],
    pub warnings: &'a [Warning],
    pub pending: &'a [PendingRecord],
}

pub async fn get_snapshot<C: SourceClient>(State(engine): State<AppState<C>>) -> Response {
    let view = engine.view();
    let snapshot = &view.snapshot;

    Json(SnapshotResponse {
        generation: snapshot.generation,
        reconciled_at: snapshot.reconciled_at,
        riders: view.riders(),
        operators: view.operators(),
        vehicles: view.vehicles(),
        routes: &snapshot.routes,
        enriched_riders: &snapshot.enriched_riders,
        enriched_operators: &snapshot.enriched_operators,
        load_records: &snapshot.load_records,
        warnings: &snapshot.warnings,
        pending: &view.pending,
    })
    .into_response()
}

pub async fn reconcile<C: SourceClient>(State(engine): State<AppState<C>>) -> Json<RosterSummary> {
    engine.reconcile().await;
    let view = engine.view();
    Json(RosterSummary::new(&view.snapshot, &view.pending))
}

pub async fn get_summary<C: SourceClient>(
    State(engine): State<AppState<C>>,
) -> Json<RosterSummary> {
    let view = engine.view();
    Json(RosterSummary::new(&view.snapshot, &view.pending))
}

pub async fn list_riders<C: SourceClient>(
    State(engine): State<AppState<C>>,
    Query(filter): Query<RiderFilter>,
) -> Json<ListResponse<EnrichedRider>> {
    let snapshot = engine.snapshot();
    let riders: Vec<EnrichedRider> = snapshot
        .enriched_riders
        .iter()
        .filter(|enriched| filter.matches(&enriched.rider))
        .cloned()
        .collect();
    Json(riders.into())
}

pub async fn get_rider<C: SourceClient>(
    State(engine): State<AppState<C>>,
    Path(roll_no): Path<String>,
) -> Result<Json<EnrichedRider>, ApiError> {
    engine
        .snapshot()
        .find_rider(&roll_no)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Rider '{}' not found", roll_no)))
}

pub async fn get_operator<C: SourceClient>(
    State(engine): State<AppState<C>>,
    Path(operator_id): Path<String>,
) -> Result<Json<EnrichedOperator>, ApiError> {
    engine
        .snapshot()
        .find_operator(&operator_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Operator '{}' not found", operator_id)))
}

pub async fn list_load<C: SourceClient>(
    State(engine): State<AppState<C>>,
) -> Json<ListResponse<LoadRecord>> {
    Json(engine.snapshot().load_records.clone().into())
}

fn parse_kind(kind: &str) -> Result<EntityKind, ApiError> {
    kind.parse::<EntityKind>().map_err(ApiError::BadRequest)
}

fn body_record(body: Value) -> Result<RawRecord, ApiError> {
    parse_record(body).map_err(|e| ApiError::BadRequest(format!("Invalid record: {}", e)))
}

pub async fn submit_record<C: SourceClient>(
    State(engine): State<AppState<C>>,
    Path(kind): Path<String>,
    RequestJson(body): RequestJson<Value>,
) -> Result<(StatusCode, Json<PendingRecord>), ApiError> {
    let kind = parse_kind(&kind)?;
    let pending = engine.submit_new(kind, body_record(body)?).await?;
    Ok((StatusCode::CREATED, Json(pending)))
}

/// Accepts the record store's `{"data": {...}}` envelope or a bare object.
pub async fn update_record<C: SourceClient>(
    State(engine): State<AppState<C>>,
    Path((kind, key)): Path<(String, String)>,
    RequestJson(body): RequestJson<Value>,
) -> Result<StatusCode, ApiError> {
    let kind = parse_kind(&kind)?;
    let fields = match body {
        Value::Object(mut object) if object.len() == 1 && object.contains_key("data") => {
            object.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    engine.update_fields(kind, &key, body_record(fields)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn export_collection<C: SourceClient>(
    State(engine): State<AppState<C>>,
    Path(collection): Path<String>,
) -> Result<Response, ApiError> {
    let collection: ExportCollection = collection.parse()?;
    let snapshot = engine.snapshot();
    let name = collection.as_str();

    let file: ExportFile = match collection {
        ExportCollection::Riders => export_csv(name, &snapshot.riders)?,
        ExportCollection::Operators => export_csv(name, &snapshot.operators)?,
        ExportCollection::Vehicles => export_csv(name, &snapshot.vehicles)?,
        ExportCollection::Routes => export_csv(name, &snapshot.routes)?,
        ExportCollection::Load => export_csv(name, &snapshot.load_records)?,
    };

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file.file_name),
        ),
    ];
    Ok((headers, file.content).into_response())
}
