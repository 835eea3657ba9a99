use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    EnrichedOperator, EnrichedRider, Id, LoadRecord, Operator, Rider, Route, Vehicle,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A source could not be fetched; it contributed no records to the pass.
    SourceUnavailable,
    /// Records lacked their identifying key and were kept unresolved.
    MalformedRecord,
}

/// Non-fatal condition recorded during a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub source_id: String,
    pub message: String,
}

impl Warning {
    pub fn source_unavailable(source_id: &str, message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::SourceUnavailable,
            source_id: source_id.to_string(),
            message: message.into(),
        }
    }

    pub fn malformed_records(source_id: &str, count: usize, key_label: &str) -> Self {
        Self {
            kind: WarningKind::MalformedRecord,
            source_id: source_id.to_string(),
            message: format!("{} record(s) missing '{}'", count, key_label),
        }
    }
}

/// Everything one reconciliation pass produced. Never mutated after publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub generation: u64,
    pub reconciled_at: Option<DateTime<Utc>>,
    pub riders: Vec<Rider>,
    pub operators: Vec<Operator>,
    pub vehicles: Vec<Vehicle>,
    pub routes: Vec<Route>,
    pub enriched_riders: Vec<EnrichedRider>,
    pub enriched_operators: Vec<EnrichedOperator>,
    pub load_records: Vec<LoadRecord>,
    pub warnings: Vec<Warning>,
}

impl Snapshot {
    /// The state before the first pass has published.
    pub fn empty() -> Self {
        Self {
            generation: 0,
            reconciled_at: None,
            riders: Vec::new(),
            operators: Vec::new(),
            vehicles: Vec::new(),
            routes: Vec::new(),
            enriched_riders: Vec::new(),
            enriched_operators: Vec::new(),
            load_records: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn find_rider(&self, roll_no: &str) -> Option<&EnrichedRider> {
        self.enriched_riders
            .iter()
            .find(|enriched| enriched.rider.key() == Some(roll_no))
    }

    pub fn find_operator(&self, operator_id: &str) -> Option<&EnrichedOperator> {
        self.enriched_operators
            .iter()
            .find(|enriched| enriched.operator.key() == Some(operator_id))
    }

    /// Whether a submitted record is present under its natural key. Riders
    /// also have to come from the same shard.
    pub fn contains(&self, entity: &PendingEntity) -> bool {
        match entity {
            PendingEntity::Rider(rider) => rider.key().is_some_and(|roll_no| {
                self.riders
                    .iter()
                    .any(|r| r.shard_id == rider.shard_id && r.key() == Some(roll_no))
            }),
            PendingEntity::Operator(operator) => operator
                .key()
                .is_some_and(|id| self.operators.iter().any(|o| o.key() == Some(id))),
            PendingEntity::Vehicle(vehicle) => vehicle
                .key()
                .is_some_and(|id| self.vehicles.iter().any(|v| v.key() == Some(id))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    /// Accepted by a record store but not yet seen by a reconciliation pass.
    Pending,
    /// Part of the published snapshot.
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "lowercase")]
pub enum PendingEntity {
    Rider(Rider),
    Operator(Operator),
    Vehicle(Vehicle),
}

/// A locally accepted submission awaiting confirmation by the next pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRecord {
    pub id: Id,
    pub sequence: u64,
    pub submitted_at: DateTime<Utc>,
    pub state: RecordState,
    pub entity: PendingEntity,
}

/// A record tagged with whether it is trusted or still pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tracked<'a, T> {
    pub state: RecordState,
    pub record: &'a T,
}
