use chrono::Utc;
use futures::future::join_all;
use log::{info, warn};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::config::{AnalysisConfig, SourcesConfig};
use crate::logic::{LoadAnalyzer, Resolver, ShardMerger};
use crate::model::{
    EntityKind, Operator, PendingEntity, PendingRecord, RawRecord, Rider, Route, Snapshot, Vehicle,
    Warning,
};
use crate::source::{FetchOutcome, SourceClient, SourceEndpoint, SourceFailure};
use crate::store::{RosterStore, RosterView};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("no {0} with key '{1}' in the current roster")]
    UnknownKey(EntityKind, String),

    #[error("no record store is configured for {0} records")]
    NoEndpoint(EntityKind),

    #[error("{0} records cannot be submitted")]
    UnsupportedKind(EntityKind),

    #[error("write rejected by record store: {0}")]
    WriteRejected(#[from] SourceFailure),
}

/// Runs reconciliation passes against the configured record stores and owns
/// the aggregate store they publish into.
pub struct RosterEngine<C: SourceClient> {
    client: C,
    sources: SourcesConfig,
    analyzer: LoadAnalyzer,
    store: Arc<RosterStore>,
}

impl<C: SourceClient> RosterEngine<C> {
    pub fn new(client: C, sources: SourcesConfig, analysis: AnalysisConfig) -> Self {
        Self {
            client,
            sources,
            analyzer: LoadAnalyzer::new(analysis),
            store: Arc::new(RosterStore::new()),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn view(&self) -> RosterView {
        self.store.view()
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.snapshot()
    }

    async fn fetch_optional(
        &self,
        endpoint: Option<&SourceEndpoint>,
    ) -> Option<(String, FetchOutcome)> {
        match endpoint {
            Some(endpoint) => Some((endpoint.id.clone(), self.client.fetch(endpoint).await)),
            None => None,
        }
    }

    /// Run one full pass: fetch every source concurrently, merge rider shards,
    /// resolve references, analyze load, then swap the snapshot in.
    ///
    /// Never fails. Sources that cannot be fetched become warnings; with every
    /// source down the result is an empty snapshot with one warning per source.
    /// Dropping the returned future before completion leaves the store untouched.
    pub async fn reconcile(&self) -> Arc<Snapshot> {
        let ticket = self.store.begin_pass();
        let started = Instant::now();
        info!(
            "Reconciliation pass {} started ({} sources)",
            ticket.generation,
            self.sources.endpoint_count()
        );

        let shard_fetches = join_all(self.sources.rider_shards.iter().map(|endpoint| async move {
            (endpoint.id.clone(), self.client.fetch(endpoint).await)
        }));
        let (shards, operators, vehicles, routes) = tokio::join!(
            shard_fetches,
            self.fetch_optional(self.sources.operators.as_ref()),
            self.fetch_optional(self.sources.vehicles.as_ref()),
            self.fetch_optional(self.sources.routes.as_ref()),
        );

        let merged = ShardMerger::merge_shards(shards);
        let mut warnings = merged.warnings;
        let riders = merged.riders;
        let operators = collect_entities(
            operators,
            Operator::from_raw,
            |o: &Operator| o.key().is_some(),
            EntityKind::Operator.key_label(),
            &mut warnings,
        );
        let vehicles = collect_entities(
            vehicles,
            Vehicle::from_raw,
            |v: &Vehicle| v.key().is_some(),
            EntityKind::Vehicle.key_label(),
            &mut warnings,
        );
        let routes = collect_entities(
            routes,
            Route::from_raw,
            |r: &Route| r.key().is_some(),
            EntityKind::Route.key_label(),
            &mut warnings,
        );

        let resolver = Resolver::new(&operators, &vehicles, &routes);
        let enriched_riders = riders.iter().map(|rider| resolver.resolve_rider(rider)).collect();
        let enriched_operators = operators
            .iter()
            .map(|operator| resolver.resolve_operator(operator, &riders))
            .collect();
        let load_records = self.analyzer.analyze(&riders, &vehicles);

        info!(
            "Reconciliation pass {} finished in {:?}: {} riders, {} operators, {} vehicles, \
             {} routes, {} warnings",
            ticket.generation,
            started.elapsed(),
            riders.len(),
            operators.len(),
            vehicles.len(),
            routes.len(),
            warnings.len()
        );

        let snapshot = Snapshot {
            generation: ticket.generation,
            reconciled_at: Some(Utc::now()),
            riders,
            operators,
            vehicles,
            routes,
            enriched_riders,
            enriched_operators,
            load_records,
            warnings,
        };
        self.store.publish(ticket, snapshot)
    }

    /// Rider shard a new rider belongs in: the shard holding its department,
    /// else the first configured shard.
    fn shard_for(&self, rider: &Rider) -> Option<&SourceEndpoint> {
        self.sources
            .rider_shards
            .iter()
            .find(|endpoint| endpoint.holds_sub_unit(&rider.department))
            .or_else(|| self.sources.rider_shards.first())
    }

    fn entity_endpoint(&self, kind: EntityKind) -> Result<&SourceEndpoint, SubmitError> {
        let endpoint = match kind {
            EntityKind::Operator => self.sources.operators.as_ref(),
            EntityKind::Vehicle => self.sources.vehicles.as_ref(),
            EntityKind::Route => self.sources.routes.as_ref(),
            EntityKind::Rider => self.sources.rider_shards.first(),
        };
        endpoint.ok_or(SubmitError::NoEndpoint(kind))
    }

    /// Write a new record through to its record store, then hold it locally as
    /// pending. Nothing is stored locally if validation or the write fails.
    ///
    /// The pending sequence is reserved before the write, so a pass that starts
    /// while the write is in flight counts the submission as already made.
    pub async fn submit_new(
        &self,
        kind: EntityKind,
        record: RawRecord,
    ) -> Result<PendingRecord, SubmitError> {
        let (endpoint, raw, entity) = match kind {
            EntityKind::Rider => {
                let mut rider = Rider::from_raw(&record, "");
                check_required(rider.missing_fields())?;
                let endpoint = self.shard_for(&rider).ok_or(SubmitError::NoEndpoint(kind))?;
                rider.shard_id = endpoint.id.clone();
                (endpoint, rider.to_raw(), PendingEntity::Rider(rider))
            }
            EntityKind::Operator => {
                let operator = Operator::from_raw(&record);
                check_required(operator.missing_fields())?;
                let endpoint = self.entity_endpoint(kind)?;
                (endpoint, operator.to_raw(), PendingEntity::Operator(operator))
            }
            EntityKind::Vehicle => {
                let vehicle = Vehicle::from_raw(&record);
                check_required(vehicle.missing_fields())?;
                let endpoint = self.entity_endpoint(kind)?;
                (endpoint, vehicle.to_raw(), PendingEntity::Vehicle(vehicle))
            }
            EntityKind::Route => return Err(SubmitError::UnsupportedKind(kind)),
        };

        let sequence = self.store.reserve_sequence();
        if let Err(failure) = self.client.insert(endpoint, raw).await {
            warn!("New {} rejected by '{}': {}", kind, endpoint.id, failure.cause);
            return Err(failure.into());
        }
        info!("New {} written to '{}'", kind, endpoint.id);
        Ok(self.store.push_pending(sequence, entity))
    }

    /// Partial update keyed by natural key. Riders are routed to the shard that
    /// holds them in the current snapshot. The local roster is not touched;
    /// the change appears after the next pass.
    pub async fn update_fields(
        &self,
        kind: EntityKind,
        key: &str,
        fields: RawRecord,
    ) -> Result<(), SubmitError> {
        if fields.is_empty() {
            return Err(SubmitError::MissingFields(vec!["data"]));
        }

        let endpoint = match kind {
            EntityKind::Rider => {
                let snapshot = self.store.snapshot();
                let shard_id = snapshot
                    .riders
                    .iter()
                    .find(|rider| rider.key() == Some(key))
                    .map(|rider| rider.shard_id.clone())
                    .ok_or_else(|| SubmitError::UnknownKey(kind, key.to_string()))?;
                self.sources
                    .rider_shards
                    .iter()
                    .find(|endpoint| endpoint.id == shard_id)
                    .ok_or(SubmitError::NoEndpoint(kind))?
            }
            _ => self.entity_endpoint(kind)?,
        };

        if let Err(failure) = self.client.update(endpoint, kind.key_label(), key, fields).await {
            warn!(
                "Update of {} '{}' rejected by '{}': {}",
                kind, key, endpoint.id, failure.cause
            );
            return Err(failure.into());
        }
        info!("Updated {} '{}' in '{}'", kind, key, endpoint.id);
        Ok(())
    }
}

fn check_required(missing: Vec<&'static str>) -> Result<(), SubmitError> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SubmitError::MissingFields(missing))
    }
}

/// Normalize one non-sharded entity source. Records without their key stay in
/// the collection (they just never join) and are counted in one warning.
fn collect_entities<T>(
    fetched: Option<(String, FetchOutcome)>,
    normalize: impl Fn(&RawRecord) -> T,
    has_key: impl Fn(&T) -> bool,
    key_label: &str,
    warnings: &mut Vec<Warning>,
) -> Vec<T> {
    let Some((source_id, outcome)) = fetched else {
        return Vec::new();
    };

    match outcome {
        Ok(records) => {
            let entities: Vec<T> = records.iter().map(normalize).collect();
            let missing_key = entities.iter().filter(|entity| !has_key(entity)).count();
            if missing_key > 0 {
                warn!(
                    "Source '{}': {} record(s) without '{}'",
                    source_id, missing_key, key_label
                );
                warnings.push(Warning::malformed_records(&source_id, missing_key, key_label));
            }
            entities
        }
        Err(failure) => {
            warn!("Source '{}' skipped: {}", source_id, failure.cause);
            warnings.push(Warning::source_unavailable(&source_id, failure.cause.to_string()));
            Vec::new()
        }
    }
}
