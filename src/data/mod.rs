//! Data module - CSV loading, typed price records and E85 aggregation

mod e85;
mod loader;
mod records;

pub use e85::{E85Aggregator, FuelQuote, MonthlyPrice};
pub use loader::{clean_price, format_month, parse_month, CsvLoader, LoaderError};
pub use records::{
    ChargingStationPricePoint, FuelCategory, FuelPricePoint, RechargeOffset, RechargeOffsets,
};
