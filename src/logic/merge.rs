use log::warn;

use crate::model::{Rider, Warning};
use crate::source::FetchOutcome;

/// Riders merged from every reachable shard, plus what went wrong on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub riders: Vec<Rider>,
    pub warnings: Vec<Warning>,
}

/// Combines same-schema rider shards into one collection.
///
/// Records from different shards are never deduplicated against each other:
/// roll numbers are only unique within a shard, and the `shard_id` carried by
/// each rider is what keeps two equal roll numbers apart.
pub struct ShardMerger;

impl ShardMerger {
    /// Merge shards in the given priority order.
    ///
    /// A failed shard contributes one `SourceUnavailable` warning and no
    /// records; the other shards merge as usual. Riders without a serial number
    /// get their 1-based position in the merged collection, so serials depend
    /// on shard order while the set of accepted riders does not.
    pub fn merge_shards(shards: Vec<(String, FetchOutcome)>) -> MergeOutcome {
        let mut riders = Vec::new();
        let mut warnings = Vec::new();

        for (shard_id, outcome) in shards {
            let records = match outcome {
                Ok(records) => records,
                Err(failure) => {
                    warn!("Rider shard '{}' skipped: {}", shard_id, failure.cause);
                    let message = failure.cause.to_string();
                    warnings.push(Warning::source_unavailable(&shard_id, message));
                    continue;
                }
            };

            let mut missing_key = 0;
            for raw in &records {
                let mut rider = Rider::from_raw(raw, &shard_id);
                if !rider.has_serial_no() {
                    rider.serial_no = (riders.len() + 1).to_string();
                }
                if rider.key().is_none() {
                    missing_key += 1;
                }
                riders.push(rider);
            }

            if missing_key > 0 {
                warn!(
                    "Rider shard '{}': {} record(s) without a roll number",
                    shard_id, missing_key
                );
                warnings.push(Warning::malformed_records(&shard_id, missing_key, "Roll No"));
            }
        }

        MergeOutcome { riders, warnings }
    }
}
