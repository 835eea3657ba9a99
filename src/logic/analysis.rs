//! Per-vehicle occupancy analysis.
//!
//! Every run starts from a clean slate: the result depends only on the rider
//! and vehicle collections passed in, with no smoothing or history.

use itertools::Itertools;
use log::debug;
use std::collections::HashMap;

use crate::config::AnalysisConfig;
use crate::model::{LoadClassification, LoadRecord, Rider, Vehicle};

#[derive(Debug, Clone, Default)]
pub struct LoadAnalyzer {
    config: AnalysisConfig,
}

impl LoadAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Strict inequalities: a count exactly at a threshold is not past it.
    pub fn classify(&self, count: usize, capacity: u32) -> LoadClassification {
        let count = count as f64;
        let capacity = capacity as f64;
        if count > capacity * self.config.overcrowded_ratio {
            LoadClassification::Overcrowded
        } else if count < capacity * self.config.underutilized_ratio {
            LoadClassification::Underutilized
        } else {
            LoadClassification::Ok
        }
    }

    /// Percentage of capacity in use, rounded half away from zero.
    pub fn utilization(count: usize, capacity: u32) -> u32 {
        (100.0 * count as f64 / capacity as f64).round() as u32
    }

    /// One record per vehicle key that has riders, ordered by vehicle key.
    /// Riders without a vehicle key are left out. Vehicles missing from the
    /// vehicle collection, or without a usable capacity, use the default capacity.
    pub fn analyze(&self, riders: &[Rider], vehicles: &[Vehicle]) -> Vec<LoadRecord> {
        let mut capacities: HashMap<&str, Option<u32>> = HashMap::new();
        for vehicle in vehicles {
            if let Some(vehicle_no) = vehicle.key() {
                capacities.entry(vehicle_no).or_insert(vehicle.capacity);
            }
        }

        riders
            .iter()
            .filter_map(Rider::vehicle_key)
            .counts()
            .into_iter()
            .sorted()
            .map(|(vehicle_no, count)| {
                let capacity = capacities
                    .get(vehicle_no)
                    .copied()
                    .flatten()
                    .filter(|capacity| *capacity > 0)
                    .unwrap_or(self.config.default_capacity);
                let classification = self.classify(count, capacity);
                debug!(
                    "Vehicle {}: {}/{} riders, {}",
                    vehicle_no, count, capacity, classification
                );

                LoadRecord {
                    vehicle_no: vehicle_no.to_string(),
                    capacity,
                    assigned_riders: count,
                    utilization: Self::utilization(count, capacity),
                    classification,
                    recommendation: classification.recommendation().to_string(),
                }
            })
            .collect()
    }
}
