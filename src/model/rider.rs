use serde::{Deserialize, Serialize};

use crate::model::{available, FieldReader, RawRecord, NOT_AVAILABLE};

const SERIAL_NO: &[&str] = &["serialno", "serialnumber", "sno"];
const NAME: &[&str] = &["name", "studentname", "ridername"];
const ROLL_NO: &[&str] = &["rollno", "rollnumber", "riderid"];
const DEPARTMENT: &[&str] = &["department", "dept", "subunit"];
const YEAR: &[&str] = &["year", "cohort"];
const VEHICLE_NO: &[&str] = &["busno", "vehicleno", "vehiclenumber", "busnumber"];
const ROUTE_NAME: &[&str] = &["routename"];
const ROUTE_NUMBER: &[&str] = &["routenumber", "routeno"];

/// A rider as held in one organizational shard.
///
/// `roll_no` is only unique inside `shard_id`; two shards may hold the same
/// roll number and the roster keeps both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rider {
    pub serial_no: String,
    pub name: String,
    pub roll_no: String,
    pub department: String,
    pub year: String,
    pub vehicle_no: String,
    pub route_name: String,
    pub route_number: String,
    pub shard_id: String,
}

impl Rider {
    /// Map a raw shard record onto the canonical rider shape. Unknown labels are
    /// ignored and absent fields become the sentinel.
    pub fn from_raw(raw: &RawRecord, shard_id: &str) -> Self {
        let fields = FieldReader::new(raw);
        Self {
            serial_no: fields.text(SERIAL_NO),
            name: fields.text(NAME),
            roll_no: fields.text(ROLL_NO),
            department: fields.text(DEPARTMENT),
            year: fields.text(YEAR),
            vehicle_no: fields.text(VEHICLE_NO),
            route_name: fields.text(ROUTE_NAME),
            route_number: fields.text(ROUTE_NUMBER),
            shard_id: shard_id.to_string(),
        }
    }

    /// Header-labelled form written back to a record store.
    pub fn to_raw(&self) -> RawRecord {
        let mut raw = RawRecord::new();
        if let Some(serial_no) = available(&self.serial_no) {
            raw.insert("Serial No".to_string(), serial_no.to_string());
        }
        raw.insert("Name".to_string(), self.name.clone());
        raw.insert("Roll No".to_string(), self.roll_no.clone());
        raw.insert("Department".to_string(), self.department.clone());
        raw.insert("Year".to_string(), self.year.clone());
        raw.insert("Bus No".to_string(), self.vehicle_no.clone());
        raw.insert("Route Name".to_string(), self.route_name.clone());
        raw.insert("Route Number".to_string(), self.route_number.clone());
        raw
    }

    pub fn key(&self) -> Option<&str> {
        available(&self.roll_no)
    }

    pub fn vehicle_key(&self) -> Option<&str> {
        available(&self.vehicle_no)
    }

    pub fn route_key(&self) -> Option<&str> {
        available(&self.route_number)
    }

    pub fn has_serial_no(&self) -> bool {
        self.serial_no != NOT_AVAILABLE
    }

    /// Labels of the fields a new submission must carry.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("rollNo", &self.roll_no),
            ("department", &self.department),
            ("year", &self.year),
            ("busNo", &self.vehicle_no),
            ("routeName", &self.route_name),
            ("routeNumber", &self.route_number),
        ]
        .into_iter()
        .filter(|(_, value)| available(value).is_none())
        .map(|(label, _)| label)
        .collect()
    }
}
