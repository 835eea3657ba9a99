use serde::{Deserialize, Serialize};

use crate::model::{available, FieldReader, RawRecord};

const OPERATOR_ID: &[&str] = &["driverid", "operatorid"];
const NAME: &[&str] = &["name", "drivername", "operatorname"];
const CONTACT: &[&str] = &["contact", "phone", "contactno"];
const VEHICLE_NO: &[&str] = &["busno", "vehicleno", "vehiclenumber", "busnumber"];
const ROUTE: &[&str] = &["route", "routenumber", "routename"];
const LICENSE_NO: &[&str] = &["licenseno", "licensenumber", "license"];

/// A vehicle operator. `operator_id` is globally unique across the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub operator_id: String,
    pub name: String,
    pub contact: String,
    pub vehicle_no: String,
    pub route: String,
    pub license_no: String,
}

impl Operator {
    pub fn from_raw(raw: &RawRecord) -> Self {
        let fields = FieldReader::new(raw);
        Self {
            operator_id: fields.text(OPERATOR_ID),
            name: fields.text(NAME),
            contact: fields.text(CONTACT),
            vehicle_no: fields.text(VEHICLE_NO),
            route: fields.text(ROUTE),
            license_no: fields.text(LICENSE_NO),
        }
    }

    pub fn to_raw(&self) -> RawRecord {
        let mut raw = RawRecord::new();
        raw.insert("Driver ID".to_string(), self.operator_id.clone());
        raw.insert("Name".to_string(), self.name.clone());
        raw.insert("Contact".to_string(), self.contact.clone());
        raw.insert("Bus No".to_string(), self.vehicle_no.clone());
        raw.insert("Route".to_string(), self.route.clone());
        raw.insert("License No".to_string(), self.license_no.clone());
        raw
    }

    pub fn key(&self) -> Option<&str> {
        available(&self.operator_id)
    }

    pub fn vehicle_key(&self) -> Option<&str> {
        available(&self.vehicle_no)
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("driverId", &self.operator_id),
            ("contact", &self.contact),
            ("busNo", &self.vehicle_no),
            ("route", &self.route),
            ("licenseNo", &self.license_no),
        ]
        .into_iter()
        .filter(|(_, value)| available(value).is_none())
        .map(|(label, _)| label)
        .collect()
    }
}
