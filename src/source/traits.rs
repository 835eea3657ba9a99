use serde::{Deserialize, Serialize};

use crate::model::RawRecord;
use crate::source::SourceFailure;

/// Location of one external record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEndpoint {
    pub id: String,
    pub url: String,
    /// Organizational sub-unit held by a rider shard (e.g. a department code).
    #[serde(default)]
    pub sub_unit: Option<String>,
}

impl SourceEndpoint {
    pub fn new(id: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            url: url.to_string(),
            sub_unit: None,
        }
    }

    pub fn with_sub_unit(mut self, sub_unit: &str) -> Self {
        self.sub_unit = Some(sub_unit.to_string());
        self
    }

    pub fn holds_sub_unit(&self, sub_unit: &str) -> bool {
        self.sub_unit
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(sub_unit.trim()))
    }
}

pub type FetchOutcome = Result<Vec<RawRecord>, SourceFailure>;

/// Access to remotely-owned record stores. Implementations never panic or
/// leak transport errors: every call resolves to a tagged result.
#[async_trait::async_trait]
pub trait SourceClient: Send + Sync {
    /// Fetch the current record set, verbatim.
    async fn fetch(&self, endpoint: &SourceEndpoint) -> FetchOutcome;
    /// Append a new record.
    async fn insert(
        &self,
        endpoint: &SourceEndpoint,
        record: RawRecord,
    ) -> Result<(), SourceFailure>;
    /// Overwrite `fields` on the record whose `key_label` equals `key`.
    async fn update(
        &self,
        endpoint: &SourceEndpoint,
        key_label: &str,
        key: &str,
        fields: RawRecord,
    ) -> Result<(), SourceFailure>;
}
