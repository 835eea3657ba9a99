use serde::{Deserialize, Serialize};

use crate::model::Rider;

/// Roster search as offered to dashboards. Any filter set to `"all"` (or left
/// out) matches every rider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiderFilter {
    /// Case-insensitive substring of the rider's name or roll number.
    pub search: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl RiderFilter {
    pub fn matches(&self, rider: &Rider) -> bool {
        let matches_search = active(&self.search).map_or(true, |term| {
            let term = term.to_lowercase();
            rider.name.to_lowercase().contains(&term)
                || rider.roll_no.to_lowercase().contains(&term)
        });
        let matches_department =
            active(&self.department).map_or(true, |department| rider.department == department);
        let matches_year = active(&self.year).map_or(true, |year| rider.year == year);

        matches_search && matches_department && matches_year
    }
}
