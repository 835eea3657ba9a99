use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{LoadClassification, PendingRecord, Snapshot};

/// Headline counts for a dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterSummary {
    pub total_riders: usize,
    pub total_operators: usize,
    pub total_vehicles: usize,
    pub total_routes: usize,
    pub overcrowded_vehicles: usize,
    pub underutilized_vehicles: usize,
    pub pending_submissions: usize,
    pub warnings: usize,
    pub generation: u64,
    pub reconciled_at: Option<DateTime<Utc>>,
}

impl RosterSummary {
    /// Counts cover the confirmed snapshot only; pending submissions are
    /// reported on their own.
    pub fn new(snapshot: &Snapshot, pending: &[PendingRecord]) -> Self {
        let classified = |classification: LoadClassification| {
            snapshot
                .load_records
                .iter()
                .filter(|record| record.classification == classification)
                .count()
        };

        Self {
            total_riders: snapshot.riders.len(),
            total_operators: snapshot.operators.len(),
            total_vehicles: snapshot.vehicles.len(),
            total_routes: snapshot.routes.len(),
            overcrowded_vehicles: classified(LoadClassification::Overcrowded),
            underutilized_vehicles: classified(LoadClassification::Underutilized),
            pending_submissions: pending.len(),
            warnings: snapshot.warnings.len(),
            generation: snapshot.generation,
            reconciled_at: snapshot.reconciled_at,
        }
    }
}
