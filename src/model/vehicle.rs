use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{available, FieldReader, RawRecord, NOT_AVAILABLE};

const VEHICLE_NO: &[&str] = &["busno", "vehicleno", "vehiclenumber", "busnumber"];
const CAPACITY: &[&str] = &["capacity", "seats"];
const ROUTE_NAME: &[&str] = &["routename"];
const ROUTE_NUMBER: &[&str] = &["routenumber", "routeno"];
const OPERATOR_ASSIGNED: &[&str] = &["driverassigned", "operatorassigned", "driverid"];
const STATUS: &[&str] = &["status"];

/// Operational status. Free text outside the known values is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VehicleStatus {
    Active,
    Inactive,
    Maintenance,
    Unknown,
    Other(String),
}

impl From<String> for VehicleStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => VehicleStatus::Active,
            "inactive" => VehicleStatus::Inactive,
            "maintenance" => VehicleStatus::Maintenance,
            "" | "n/a" => VehicleStatus::Unknown,
            _ => VehicleStatus::Other(value.trim().to_string()),
        }
    }
}

impl From<VehicleStatus> for String {
    fn from(status: VehicleStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleStatus::Active => f.write_str("active"),
            VehicleStatus::Inactive => f.write_str("inactive"),
            VehicleStatus::Maintenance => f.write_str("maintenance"),
            VehicleStatus::Unknown => f.write_str(NOT_AVAILABLE),
            VehicleStatus::Other(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub vehicle_no: String,
    /// Rated capacity; `None` when absent, unparsable or not positive.
    pub capacity: Option<u32>,
    pub route_name: String,
    pub route_number: String,
    /// Back-reference to the assigned operator's ID.
    pub operator_assigned: String,
    pub status: VehicleStatus,
}

impl Vehicle {
    pub fn from_raw(raw: &RawRecord) -> Self {
        let fields = FieldReader::new(raw);
        Self {
            vehicle_no: fields.text(VEHICLE_NO),
            capacity: fields.get(CAPACITY).and_then(parse_capacity),
            route_name: fields.text(ROUTE_NAME),
            route_number: fields.text(ROUTE_NUMBER),
            operator_assigned: fields.text(OPERATOR_ASSIGNED),
            status: fields.text(STATUS).into(),
        }
    }

    pub fn to_raw(&self) -> RawRecord {
        let mut raw = RawRecord::new();
        raw.insert("Bus No".to_string(), self.vehicle_no.clone());
        if let Some(capacity) = self.capacity {
            raw.insert("Capacity".to_string(), capacity.to_string());
        }
        raw.insert("Route Name".to_string(), self.route_name.clone());
        raw.insert("Route Number".to_string(), self.route_number.clone());
        if let Some(operator) = available(&self.operator_assigned) {
            raw.insert("Driver Assigned".to_string(), operator.to_string());
        }
        raw.insert("Status".to_string(), self.status.to_string());
        raw
    }

    pub fn key(&self) -> Option<&str> {
        available(&self.vehicle_no)
    }

    /// Capacity used for load analysis.
    pub fn effective_capacity(&self, default_capacity: u32) -> u32 {
        self.capacity.unwrap_or(default_capacity)
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.key().is_none() {
            missing.push("busNo");
        }
        if self.capacity.is_none() {
            missing.push("capacity");
        }
        if available(&self.route_name).is_none() {
            missing.push("routeName");
        }
        if available(&self.route_number).is_none() {
            missing.push("routeNumber");
        }
        if self.status == VehicleStatus::Unknown {
            missing.push("status");
        }
        missing
    }
}

/// Leading-integer parse: `"45 seats"` reads as 45. Zero counts as unknown.
fn parse_capacity(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u32>().ok().filter(|capacity| *capacity > 0)
}
