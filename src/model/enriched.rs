use serde::{Deserialize, Serialize};

use crate::model::{Operator, Rider, Route, Vehicle, NOT_AVAILABLE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorContext {
    pub operator_id: String,
    pub name: String,
    pub contact: String,
    pub license_no: String,
}

impl OperatorContext {
    pub fn not_available() -> Self {
        Self {
            operator_id: NOT_AVAILABLE.to_string(),
            name: NOT_AVAILABLE.to_string(),
            contact: NOT_AVAILABLE.to_string(),
            license_no: NOT_AVAILABLE.to_string(),
        }
    }
}

impl From<&Operator> for OperatorContext {
    fn from(operator: &Operator) -> Self {
        Self {
            operator_id: operator.operator_id.clone(),
            name: operator.name.clone(),
            contact: operator.contact.clone(),
            license_no: operator.license_no.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleContext {
    pub vehicle_no: String,
    pub capacity: String,
    pub route_name: String,
    pub route_number: String,
    pub status: String,
}

impl VehicleContext {
    pub fn not_available() -> Self {
        Self {
            vehicle_no: NOT_AVAILABLE.to_string(),
            capacity: NOT_AVAILABLE.to_string(),
            route_name: NOT_AVAILABLE.to_string(),
            route_number: NOT_AVAILABLE.to_string(),
            status: NOT_AVAILABLE.to_string(),
        }
    }
}

impl From<&Vehicle> for VehicleContext {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            vehicle_no: vehicle.vehicle_no.clone(),
            capacity: vehicle
                .capacity
                .map(|capacity| capacity.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            route_name: vehicle.route_name.clone(),
            route_number: vehicle.route_number.clone(),
            status: vehicle.status.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteContext {
    pub route_number: String,
    pub route_name: String,
    pub stops: String,
    pub distance: String,
    pub avg_time: String,
}

impl RouteContext {
    pub fn not_available() -> Self {
        Self {
            route_number: NOT_AVAILABLE.to_string(),
            route_name: NOT_AVAILABLE.to_string(),
            stops: NOT_AVAILABLE.to_string(),
            distance: NOT_AVAILABLE.to_string(),
            avg_time: NOT_AVAILABLE.to_string(),
        }
    }
}

impl From<&Route> for RouteContext {
    fn from(route: &Route) -> Self {
        Self {
            route_number: route.route_number.clone(),
            route_name: route.route_name.clone(),
            stops: route.stops.clone(),
            distance: route.distance.clone(),
            avg_time: route.avg_time.clone(),
        }
    }
}

/// Rider joined with its operator, vehicle and route. Unresolved references
/// carry sentinel contexts rather than being omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRider {
    pub rider: Rider,
    pub operator: OperatorContext,
    pub vehicle: VehicleContext,
    pub route: RouteContext,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedOperator {
    pub operator: Operator,
    pub vehicle: VehicleContext,
    pub route: RouteContext,
    pub assigned_riders: usize,
}
