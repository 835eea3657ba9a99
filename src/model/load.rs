use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadClassification {
    Overcrowded,
    Underutilized,
    Ok,
}

impl LoadClassification {
    pub fn recommendation(&self) -> &'static str {
        match self {
            LoadClassification::Overcrowded => "extra vehicle required",
            LoadClassification::Underutilized => "vehicle can be reduced",
            LoadClassification::Ok => "optimal capacity",
        }
    }
}

impl fmt::Display for LoadClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadClassification::Overcrowded => f.write_str("overcrowded"),
            LoadClassification::Underutilized => f.write_str("underutilized"),
            LoadClassification::Ok => f.write_str("ok"),
        }
    }
}

/// Occupancy of one vehicle in one snapshot. Always recomputed, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadRecord {
    pub vehicle_no: String,
    pub capacity: u32,
    pub assigned_riders: usize,
    /// Rounded percentage of capacity in use.
    pub utilization: u32,
    pub classification: LoadClassification,
    pub recommendation: String,
}
