//! Cost Calculator Module
//! Derives a comparable cost per 100 km for each catalog vehicle from the latest prices.

use crate::data::{FuelCategory, FuelPricePoint};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;
use tracing::warn;

/// A catalog label with no matching price column.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Vehicle '{vehicle}' has unmapped fuel category '{category}'")]
pub struct MappingError {
    pub vehicle: String,
    pub category: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculatorError {
    #[error("Price feed is empty, no latest price to compute costs from")]
    EmptyPriceFeed,
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

/// Static description of a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub name: String,
    /// Liters or kWh per 100 km.
    pub consumption: f64,
    pub fuel_category: String,
}

impl VehicleSpec {
    pub fn new(name: &str, consumption: f64, fuel_category: FuelCategory) -> Self {
        Self {
            name: name.to_string(),
            consumption,
            fuel_category: fuel_category.label().to_string(),
        }
    }

    /// Label shown on the comparison chart.
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.fuel_category)
    }
}

/// Cost of driving 100 km with one vehicle at the latest prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleCostEntry {
    pub label: String,
    pub cost_per_100km: f64,
}

/// Stable descending sort by cost. NaN costs go last; ties keep their relative order.
pub fn sort_by_cost_desc(entries: &mut [VehicleCostEntry]) {
    entries.sort_by(|a, b| match (a.cost_per_100km.is_nan(), b.cost_per_100km.is_nan()) {
        (false, false) => b
            .cost_per_100km
            .partial_cmp(&a.cost_per_100km)
            .unwrap_or(Ordering::Equal),
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => Ordering::Equal,
    });
}

/// Computes vehicle costs. The catalog is only ever borrowed.
pub struct CostCalculator;

impl CostCalculator {
    /// Most recent price point: the first element of the descending feed.
    pub fn latest_prices(prices: &[FuelPricePoint]) -> Result<&FuelPricePoint, CalculatorError> {
        prices.first().ok_or(CalculatorError::EmptyPriceFeed)
    }

    /// Cost entry for one vehicle. NaN prices propagate to a NaN cost.
    pub fn cost_for(
        vehicle: &VehicleSpec,
        latest: &FuelPricePoint,
    ) -> Result<VehicleCostEntry, MappingError> {
        let category =
            FuelCategory::from_label(&vehicle.fuel_category).ok_or_else(|| MappingError {
                vehicle: vehicle.name.clone(),
                category: vehicle.fuel_category.clone(),
            })?;

        Ok(VehicleCostEntry {
            label: vehicle.display_label(),
            cost_per_100km: vehicle.consumption * latest.price(category),
        })
    }

    /// One result per catalog vehicle, in catalog order.
    pub fn compute_cost_entries(
        catalog: &[VehicleSpec],
        prices: &[FuelPricePoint],
    ) -> Result<Vec<Result<VehicleCostEntry, MappingError>>, CalculatorError> {
        let latest = Self::latest_prices(prices)?;
        Ok(catalog
            .iter()
            .map(|vehicle| Self::cost_for(vehicle, latest))
            .collect())
    }

    /// One entry per catalog vehicle, in catalog order. Fails on the first unmapped category.
    pub fn compute_costs(
        catalog: &[VehicleSpec],
        prices: &[FuelPricePoint],
    ) -> Result<Vec<VehicleCostEntry>, CalculatorError> {
        Self::compute_cost_entries(catalog, prices)?
            .into_iter()
            .map(|entry| entry.map_err(CalculatorError::from))
            .collect()
    }

    /// Like `compute_costs`, but vehicles with an unmapped category are logged and dropped.
    pub fn compute_mapped_costs(
        catalog: &[VehicleSpec],
        prices: &[FuelPricePoint],
    ) -> Result<Vec<VehicleCostEntry>, CalculatorError> {
        Ok(Self::compute_cost_entries(catalog, prices)?
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(vehicle = %err.vehicle, category = %err.category, "Vehicle skipped");
                    None
                }
            })
            .collect())
    }
}
