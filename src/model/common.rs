use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub type Id = String;

/// Placeholder stored in place of any missing or empty field.
pub const NOT_AVAILABLE: &str = "N/A";

/// A record exactly as a record store returns it: field label to text.
pub type RawRecord = BTreeMap<String, String>;

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

pub fn is_available(value: &str) -> bool {
    value != NOT_AVAILABLE
}

/// Returns `Some(value)` unless the value is the sentinel.
pub fn available(value: &str) -> Option<&str> {
    if is_available(value) {
        Some(value)
    } else {
        None
    }
}

/// Reduce a field label to its comparison form: lowercase alphanumerics only,
/// so `"Roll No"`, `"rollNo"` and `"roll_no"` all compare equal.
pub fn label_key(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Case and punctuation insensitive view over a raw record.
pub struct FieldReader<'a> {
    fields: HashMap<String, &'a str>,
}

impl<'a> FieldReader<'a> {
    pub fn new(raw: &'a RawRecord) -> Self {
        let mut fields = HashMap::with_capacity(raw.len());
        for (label, value) in raw {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            fields.entry(label_key(label)).or_insert(value);
        }
        Self { fields }
    }

    /// First non-empty value among the given label aliases (already in `label_key` form).
    pub fn get(&self, aliases: &[&str]) -> Option<&'a str> {
        aliases.iter().find_map(|alias| self.fields.get(*alias).copied())
    }

    /// Like `get`, but substitutes the sentinel for an absent value.
    pub fn text(&self, aliases: &[&str]) -> String {
        self.get(aliases).unwrap_or(NOT_AVAILABLE).to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Rider,
    Operator,
    Vehicle,
    Route,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Rider => "rider",
            EntityKind::Operator => "operator",
            EntityKind::Vehicle => "vehicle",
            EntityKind::Route => "route",
        }
    }

    /// Header label of the natural key used by partial updates.
    pub fn key_label(&self) -> &'static str {
        match self {
            EntityKind::Rider => "Roll No",
            EntityKind::Operator => "Driver ID",
            EntityKind::Vehicle => "Bus No",
            EntityKind::Route => "Route Number",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rider" | "riders" => Ok(EntityKind::Rider),
            "operator" | "operators" => Ok(EntityKind::Operator),
            "vehicle" | "vehicles" => Ok(EntityKind::Vehicle),
            "route" | "routes" => Ok(EntityKind::Route),
            other => Err(format!("Unknown entity kind '{}'", other)),
        }
    }
}
