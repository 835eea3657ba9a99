use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

use crate::model::{label_key, RawRecord};
use crate::source::{FailureCause, FetchOutcome, SourceClient, SourceEndpoint, SourceFailure};

/// In-process record stores keyed by source id. Used for demos and tests;
/// any source can be switched to "unavailable" to simulate outages.
#[derive(Debug, Default)]
pub struct MemorySourceClient {
    records: RwLock<HashMap<String, Vec<RawRecord>>>,
    unavailable: RwLock<HashSet<String>>,
}

impl MemorySourceClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(self, source_id: &str, records: Vec<RawRecord>) -> Self {
        self.set_records(source_id, records);
        self
    }

    pub fn set_records(&self, source_id: &str, records: Vec<RawRecord>) {
        self.records.write().insert(source_id.to_string(), records);
    }

    pub fn records(&self, source_id: &str) -> Vec<RawRecord> {
        self.records
            .read()
            .get(source_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_unavailable(&self, source_id: &str, unavailable: bool) {
        let mut sources = self.unavailable.write();
        if unavailable {
            sources.insert(source_id.to_string());
        } else {
            sources.remove(source_id);
        }
    }

    fn check_available(&self, endpoint: &SourceEndpoint) -> Result<(), SourceFailure> {
        if self.unavailable.read().contains(&endpoint.id) {
            return Err(SourceFailure::new(
                &endpoint.id,
                FailureCause::Network("connection refused".to_string()),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SourceClient for MemorySourceClient {
    async fn fetch(&self, endpoint: &SourceEndpoint) -> FetchOutcome {
        self.check_available(endpoint)?;
        self.records
            .read()
            .get(&endpoint.id)
            .cloned()
            .ok_or_else(|| SourceFailure::new(&endpoint.id, FailureCause::Status(404)))
    }

    async fn insert(
        &self,
        endpoint: &SourceEndpoint,
        record: RawRecord,
    ) -> Result<(), SourceFailure> {
        self.check_available(endpoint)?;
        self.records
            .write()
            .entry(endpoint.id.clone())
            .or_default()
            .push(record);
        Ok(())
    }

    async fn update(
        &self,
        endpoint: &SourceEndpoint,
        key_label: &str,
        key: &str,
        fields: RawRecord,
    ) -> Result<(), SourceFailure> {
        self.check_available(endpoint)?;
        let wanted = label_key(key_label);
        let mut records = self.records.write();
        let mut matched = 0;

        for record in records.get_mut(&endpoint.id).into_iter().flatten() {
            let is_match = record
                .iter()
                .any(|(label, value)| label_key(label) == wanted && value.trim() == key);
            if is_match {
                record.extend(fields.clone());
                matched += 1;
            }
        }

        if matched == 0 {
            return Err(SourceFailure::new(&endpoint.id, FailureCause::Status(404)));
        }
        Ok(())
    }
}
