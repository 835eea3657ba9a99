use std::collections::HashMap;

use crate::model::{
    available, EnrichedOperator, EnrichedRider, Operator, OperatorContext, Rider, Route,
    RouteContext, Vehicle, VehicleContext,
};

/// Exact-key lookup tables over one snapshot's reference collections.
///
/// Sentinel keys are never indexed, so a record with a missing key can never be
/// joined to. When a key occurs more than once the first record wins.
pub struct Resolver<'a> {
    operators_by_id: HashMap<&'a str, &'a Operator>,
    operators_by_vehicle: HashMap<&'a str, &'a Operator>,
    vehicles: HashMap<&'a str, &'a Vehicle>,
    routes_by_number: HashMap<&'a str, &'a Route>,
    routes_by_name: HashMap<&'a str, &'a Route>,
}

impl<'a> Resolver<'a> {
    pub fn new(operators: &'a [Operator], vehicles: &'a [Vehicle], routes: &'a [Route]) -> Self {
        let mut resolver = Self {
            operators_by_id: HashMap::new(),
            operators_by_vehicle: HashMap::new(),
            vehicles: HashMap::new(),
            routes_by_number: HashMap::new(),
            routes_by_name: HashMap::new(),
        };

        for operator in operators {
            if let Some(id) = operator.key() {
                resolver.operators_by_id.entry(id).or_insert(operator);
            }
            if let Some(vehicle_no) = operator.vehicle_key() {
                resolver.operators_by_vehicle.entry(vehicle_no).or_insert(operator);
            }
        }
        for vehicle in vehicles {
            if let Some(vehicle_no) = vehicle.key() {
                resolver.vehicles.entry(vehicle_no).or_insert(vehicle);
            }
        }
        for route in routes {
            if let Some(number) = route.key() {
                resolver.routes_by_number.entry(number).or_insert(route);
            }
            if let Some(name) = route.name_key() {
                resolver.routes_by_name.entry(name).or_insert(route);
            }
        }

        resolver
    }

    fn vehicle(&self, vehicle_no: &str) -> Option<&'a Vehicle> {
        available(vehicle_no).and_then(|key| self.vehicles.get(key).copied())
    }

    /// Operator driving a vehicle: the operator listing that vehicle, else the
    /// operator the vehicle itself names.
    fn operator_for_vehicle(&self, vehicle_no: &str) -> Option<&'a Operator> {
        let key = available(vehicle_no)?;
        self.operators_by_vehicle.get(key).copied().or_else(|| {
            self.vehicles
                .get(key)
                .and_then(|vehicle| available(&vehicle.operator_assigned))
                .and_then(|id| self.operators_by_id.get(id).copied())
        })
    }

    fn route_by_number(&self, route_number: &str) -> Option<&'a Route> {
        available(route_number).and_then(|key| self.routes_by_number.get(key).copied())
    }

    /// Operators record their route as free text; try it as a number, then a name.
    fn route_by_reference(&self, reference: &str) -> Option<&'a Route> {
        self.route_by_number(reference).or_else(|| {
            available(reference).and_then(|key| self.routes_by_name.get(key).copied())
        })
    }

    /// Attach operator, vehicle and route context. Never fails: unresolved
    /// references come back as sentinel contexts.
    pub fn resolve_rider(&self, rider: &Rider) -> EnrichedRider {
        EnrichedRider {
            rider: rider.clone(),
            operator: self
                .operator_for_vehicle(&rider.vehicle_no)
                .map(OperatorContext::from)
                .unwrap_or_else(OperatorContext::not_available),
            vehicle: self
                .vehicle(&rider.vehicle_no)
                .map(VehicleContext::from)
                .unwrap_or_else(VehicleContext::not_available),
            route: self
                .route_by_number(&rider.route_number)
                .map(RouteContext::from)
                .unwrap_or_else(RouteContext::not_available),
        }
    }

    /// Re-derive an enriched view from its rider alone; applying this any
    /// number of times against the same collections gives the same result.
    pub fn refresh(&self, enriched: &EnrichedRider) -> EnrichedRider {
        self.resolve_rider(&enriched.rider)
    }

    pub fn resolve_operator(&self, operator: &Operator, riders: &[Rider]) -> EnrichedOperator {
        let assigned_riders = operator
            .vehicle_key()
            .map(|vehicle_no| {
                riders
                    .iter()
                    .filter(|rider| rider.vehicle_key() == Some(vehicle_no))
                    .count()
            })
            .unwrap_or(0);

        EnrichedOperator {
            operator: operator.clone(),
            vehicle: self
                .vehicle(&operator.vehicle_no)
                .map(VehicleContext::from)
                .unwrap_or_else(VehicleContext::not_available),
            route: self
                .route_by_reference(&operator.route)
                .map(RouteContext::from)
                .unwrap_or_else(RouteContext::not_available),
            assigned_riders,
        }
    }
}

/// One-shot form of `Resolver::resolve_rider` for callers holding plain collections.
pub fn resolve(
    rider: &Rider,
    operators: &[Operator],
    vehicles: &[Vehicle],
    routes: &[Route],
) -> EnrichedRider {
    Resolver::new(operators, vehicles, routes).resolve_rider(rider)
}
