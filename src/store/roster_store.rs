use chrono::Utc;
use log::{debug, info};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::model::{
    generate_id, Operator, PendingEntity, PendingRecord, RecordState, Rider, Snapshot, Tracked,
    Vehicle,
};

/// Published snapshot and pending submissions, always read and replaced together.
#[derive(Debug)]
struct StoreState {
    snapshot: Arc<Snapshot>,
    pending: Vec<PendingRecord>,
    published_watermark: u64,
}

/// Handed out when a reconciliation pass starts and returned when it publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassTicket {
    pub generation: u64,
    pending_watermark: u64,
}

/// Consistent read of the store at one instant.
#[derive(Debug, Clone)]
pub struct RosterView {
    pub snapshot: Arc<Snapshot>,
    pub pending: Vec<PendingRecord>,
}

impl RosterView {
    /// Confirmed riders followed by riders still awaiting a pass.
    pub fn riders(&self) -> Vec<Tracked<'_, Rider>> {
        let confirmed = self.snapshot.riders.iter().map(|record| Tracked {
            state: RecordState::Confirmed,
            record,
        });
        let pending = self.pending.iter().filter_map(|p| match &p.entity {
            PendingEntity::Rider(record) => Some(Tracked {
                state: RecordState::Pending,
                record,
            }),
            _ => None,
        });
        confirmed.chain(pending).collect()
    }

    pub fn operators(&self) -> Vec<Tracked<'_, Operator>> {
        let confirmed = self.snapshot.operators.iter().map(|record| Tracked {
            state: RecordState::Confirmed,
            record,
        });
        let pending = self.pending.iter().filter_map(|p| match &p.entity {
            PendingEntity::Operator(record) => Some(Tracked {
                state: RecordState::Pending,
                record,
            }),
            _ => None,
        });
        confirmed.chain(pending).collect()
    }

    pub fn vehicles(&self) -> Vec<Tracked<'_, Vehicle>> {
        let confirmed = self.snapshot.vehicles.iter().map(|record| Tracked {
            state: RecordState::Confirmed,
            record,
        });
        let pending = self.pending.iter().filter_map(|p| match &p.entity {
            PendingEntity::Vehicle(record) => Some(Tracked {
                state: RecordState::Pending,
                record,
            }),
            _ => None,
        });
        confirmed.chain(pending).collect()
    }
}

/// Process-wide holder of the most recently reconciled roster.
///
/// A pass replaces the whole snapshot in one swap, so readers see either the
/// previous or the next snapshot and never a mix. Submissions accepted by a
/// record store are kept apart as pending until a pass that started after
/// their sequence was reserved publishes them as confirmed.
#[derive(Debug)]
pub struct RosterStore {
    state: RwLock<StoreState>,
    generation: AtomicU64,
    pending_sequence: AtomicU64,
}

impl RosterStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState {
                snapshot: Arc::new(Snapshot::empty()),
                pending: Vec::new(),
                published_watermark: 0,
            }),
            generation: AtomicU64::new(0),
            pending_sequence: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.state.read().snapshot.clone()
    }

    pub fn view(&self) -> RosterView {
        let state = self.state.read();
        RosterView {
            snapshot: state.snapshot.clone(),
            pending: state.pending.clone(),
        }
    }

    pub fn begin_pass(&self) -> PassTicket {
        PassTicket {
            generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
            pending_watermark: self.pending_sequence.load(Ordering::SeqCst),
        }
    }

    /// Publish a pass's snapshot unless a later pass already has. Pending
    /// submissions reserved before this pass began and present in its
    /// snapshot are dropped with the swap.
    pub fn publish(&self, ticket: PassTicket, mut snapshot: Snapshot) -> Arc<Snapshot> {
        snapshot.generation = ticket.generation;
        let snapshot = Arc::new(snapshot);
        let mut state = self.state.write();

        if state.snapshot.generation > ticket.generation {
            debug!(
                "Pass {} superseded by pass {}; not published",
                ticket.generation, state.snapshot.generation
            );
            return snapshot;
        }

        let before = state.pending.len();
        state.pending.retain(|pending| {
            pending.sequence > ticket.pending_watermark || !snapshot.contains(&pending.entity)
        });
        state.snapshot = snapshot.clone();
        state.published_watermark = ticket.pending_watermark;

        info!(
            "Published snapshot generation {} ({} pending cleared, {} still pending)",
            ticket.generation,
            before - state.pending.len(),
            state.pending.len()
        );
        snapshot
    }

    /// Reserve the sequence of a submission before it is written to its
    /// record store. A reservation that is never pushed leaves a gap and
    /// nothing else.
    pub fn reserve_sequence(&self) -> u64 {
        self.pending_sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Record a submission the record store has already accepted. If a pass
    /// that began after the reservation has already published the record, it
    /// is returned as confirmed and not held as pending.
    pub fn push_pending(&self, sequence: u64, entity: PendingEntity) -> PendingRecord {
        let mut state = self.state.write();
        let mut record = PendingRecord {
            id: generate_id(),
            sequence,
            submitted_at: Utc::now(),
            state: RecordState::Pending,
            entity,
        };

        if sequence <= state.published_watermark && state.snapshot.contains(&record.entity) {
            debug!(
                "Submission {} already confirmed by generation {}",
                sequence, state.snapshot.generation
            );
            record.state = RecordState::Confirmed;
            return record;
        }

        state.pending.push(record.clone());
        record
    }
}

impl Default for RosterStore {
    fn default() -> Self {
        Self::new()
    }
}
