//! Fuel Price Charts
//!
//! Loads fuel/electricity price trends and public charging prices from CSV,
//! derives a cost per 100 km for a vehicle catalog and renders the comparison charts.

pub mod charts;
pub mod config;
pub mod data;
pub mod report;
pub mod stats;
