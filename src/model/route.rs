use serde::{Deserialize, Serialize};

use crate::model::{available, FieldReader, RawRecord};

const ROUTE_NUMBER: &[&str] = &["routenumber", "routeno"];
const ROUTE_NAME: &[&str] = &["routename", "name"];
const STOPS: &[&str] = &["stops"];
const DISTANCE: &[&str] = &["distance"];
const AVG_TIME: &[&str] = &["avgtime", "averagetime"];

/// A route. Stops, distance and time are display text and never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub route_number: String,
    pub route_name: String,
    pub stops: String,
    pub distance: String,
    pub avg_time: String,
}

impl Route {
    pub fn from_raw(raw: &RawRecord) -> Self {
        let fields = FieldReader::new(raw);
        Self {
            route_number: fields.text(ROUTE_NUMBER),
            route_name: fields.text(ROUTE_NAME),
            stops: fields.text(STOPS),
            distance: fields.text(DISTANCE),
            avg_time: fields.text(AVG_TIME),
        }
    }

    pub fn key(&self) -> Option<&str> {
        available(&self.route_number)
    }

    pub fn name_key(&self) -> Option<&str> {
        available(&self.route_name)
    }
}
