//! Stats module - vehicle cost calculation and price series summaries

mod calculator;
mod summary;

pub use calculator::{
    sort_by_cost_desc, CalculatorError, CostCalculator, MappingError, VehicleCostEntry,
    VehicleSpec,
};
pub use summary::PriceSummary;
