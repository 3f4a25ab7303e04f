//! JSON run report printed by the CLI.

use crate::data::MonthlyPrice;
use crate::stats::{PriceSummary, VehicleCostEntry};
use serde::Serialize;

/// Everything one run computed. NaN values serialize as `null`.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub costs: &'a [VehicleCostEntry],
    pub summaries: &'a [PriceSummary],
    pub e85_months: &'a [MonthlyPrice],
}

impl RunReport<'_> {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
