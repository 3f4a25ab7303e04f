//! CSV Data Loader Module
//! Reads the price feeds with Polars and shapes each row into a typed record.

use crate::data::records::{ChargingStationPricePoint, FuelCategory, FuelPricePoint, RechargeOffsets};
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Column names of the charging-station feed.
pub const CHARGING_DATE_COL: &str = "DT_MESURE";
pub const CHARGING_PRICE_COL: &str = "PTTC_HFA";
pub const CHARGING_TYPE_COL: &str = "TYPE_RECHARGE";

/// Date column of the fuel price feed.
pub const FUEL_DATE_COL: &str = "date";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// Parse a `YYYY-MM` cell into the first day of that month.
pub fn parse_month(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d").ok()
}

/// Format a date back to `YYYY-MM`.
pub fn format_month(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Keep a cast price only when it is a non-negative number; anything else is NaN.
pub fn clean_price(value: Option<f64>) -> f64 {
    value.filter(|v| *v >= 0.0).unwrap_or(f64::NAN)
}

/// Loads the price feeds.
pub struct CsvLoader;

impl CsvLoader {
    /// Read a CSV file with every column as a string. A blank file yields an empty frame.
    pub fn read_frame(path: &Path, separator: u8) -> Result<DataFrame, LoaderError> {
        let bytes = fs::read(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                LoaderError::NotFound(path.to_path_buf())
            } else {
                LoaderError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            debug!(path = %path.display(), "Empty CSV file");
            return Ok(DataFrame::empty());
        }

        // Schema inference disabled so that each column is cast on its own terms.
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_separator(separator)
            .with_infer_schema_length(Some(0))
            .with_truncate_ragged_lines(true)
            .finish()?
            .collect()?;

        info!(path = %path.display(), rows = df.height(), "CSV loaded");
        Ok(df)
    }

    /// Price column through a non-strict Float64 cast. A missing column is all NaN.
    pub fn price_column(df: &DataFrame, name: &str) -> Result<Vec<f64>, LoaderError> {
        let Ok(column) = df.column(name) else {
            return Ok(vec![f64::NAN; df.height()]);
        };
        let values = column.cast(&DataType::Float64)?;
        Ok(values.f64()?.into_iter().map(clean_price).collect())
    }

    /// Trimmed text cells. A missing column is all `None`.
    pub fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, LoaderError> {
        let Ok(column) = df.column(name) else {
            return Ok(vec![None; df.height()]);
        };
        Ok(column
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
            .collect())
    }

    /// `YYYY-MM` column parsed to first-of-month dates. Malformed cells are `None`.
    pub fn month_column(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>, LoaderError> {
        Ok(Self::text_column(df, name)?
            .iter()
            .map(|v| v.as_deref().and_then(parse_month))
            .collect())
    }

    /// Load the monthly fuel price feed (most recent month first in the source).
    pub fn load_fuel_prices(path: &Path) -> Result<Vec<FuelPricePoint>, LoaderError> {
        let df = Self::read_frame(path, b',')?;
        let dates = Self::month_column(&df, FUEL_DATE_COL)?;

        let mut points: Vec<FuelPricePoint> = dates.into_iter().map(FuelPricePoint::empty).collect();
        for category in FuelCategory::ALL {
            let prices = Self::price_column(&df, category.column())?;
            for (point, price) in points.iter_mut().zip(prices) {
                *point.price_mut(category) = price;
            }
        }

        let partial = points.iter().filter(|p| p.is_partial()).count();
        let undated = points.iter().filter(|p| p.date.is_none()).count();
        if partial > 0 || undated > 0 {
            debug!(partial, undated, "Fuel price rows with missing values");
        }
        Ok(points)
    }

    /// Load the charging-station feed, shifting each date by its category offset.
    pub fn load_charging_prices(
        path: &Path,
        offsets: &RechargeOffsets,
    ) -> Result<Vec<ChargingStationPricePoint>, LoaderError> {
        let df = Self::read_frame(path, b',')?;
        let dates = Self::month_column(&df, CHARGING_DATE_COL)?;
        let prices = Self::price_column(&df, CHARGING_PRICE_COL)?;
        let categories = Self::text_column(&df, CHARGING_TYPE_COL)?;

        Ok(dates
            .into_iter()
            .zip(prices)
            .zip(categories)
            .map(|((date, price_per_kwh), category)| {
                let category = category.unwrap_or_default();
                if offsets.days_for(&category).is_none() {
                    warn!(category = %category, "Unknown recharge category, date not shifted");
                }
                ChargingStationPricePoint {
                    date: date.map(|d| offsets.shift(d, &category)),
                    price_per_kwh,
                    category,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use std::env;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = env::temp_dir().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_month_sets_first_day() {
        let date = parse_month("2023-11").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2023, 11, 1));
    }

    #[test]
    fn test_month_round_trip() {
        for value in ["2020-01", "2023-12", "1999-07"] {
            assert_eq!(format_month(parse_month(value).unwrap()), value);
        }
    }

    #[test]
    fn test_parse_month_rejects_garbage() {
        assert_eq!(parse_month("2023-13"), None);
        assert_eq!(parse_month("nov. 2023"), None);
        assert_eq!(parse_month(""), None);
        assert_eq!(parse_month("2023-11-05"), None);
    }

    #[test]
    fn test_clean_price() {
        assert_eq!(clean_price(Some(1.859)), 1.859);
        assert_eq!(clean_price(Some(0.0)), 0.0);
        assert!(clean_price(Some(-1.0)).is_nan());
        assert!(clean_price(None).is_nan());
    }

    #[test]
    fn test_ragged_rows_do_not_fail_the_load() {
        let path = write_temp(
            "fuel_price_charts_loader_ragged.csv",
            "date,prix95E10,prix98E10,prixGazole,prixElec,prixE85\n\
             2024-03,1.85,1.95,1.80,0.25,0.99,extra\n\
             2024-02,1.81,1.90\n\
             2024-01,1.76,1.86,1.78,0.23,0.98\n",
        );

        let points = CsvLoader::load_fuel_prices(&path).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].e85, 0.99);
        assert_eq!(points[1].price_98_e10, 1.90);
        assert!(points[1].diesel.is_nan());
        assert!(points[1].e85.is_nan());
        assert_eq!(points[2].date, parse_month("2024-01"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_negative_price_is_nan() {
        let path = write_temp(
            "fuel_price_charts_loader_negative.csv",
            "DT_MESURE,PTTC_HFA,TYPE_RECHARGE\n2023-06,-0.42,Normale\n",
        );

        let points = CsvLoader::load_charging_prices(&path, &RechargeOffsets::default()).unwrap();
        assert!(points[0].price_per_kwh.is_nan());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_fuel_prices_keeps_order_and_marks_bad_cells() {
        let path = write_temp(
            "fuel_price_charts_loader_fuel.csv",
            "date,prix95E10,prix98E10,prixGazole,prixElec,prixE85\n\
             2024-02,1.85,1.95,1.80,0.25,0.99\n\
             2024-01,abc,1.90,1.75,0.24,\n\
             bad-date,1.70,1.80,1.65,0.23,0.95\n",
        );

        let points = CsvLoader::load_fuel_prices(&path).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].date, parse_month("2024-02"));
        assert_eq!(points[0].electricity, 0.25);
        assert!(points[1].price_95_e10.is_nan());
        assert!(points[1].e85.is_nan());
        assert_eq!(points[1].price_98_e10, 1.90);
        assert_eq!(points[2].date, None);
        assert_eq!(points[2].diesel, 1.65);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_price_column_is_nan() {
        let path = write_temp(
            "fuel_price_charts_loader_no_e85.csv",
            "date,prix95E10,prix98E10,prixGazole,prixElec\n2024-02,1.85,1.95,1.80,0.25\n",
        );

        let points = CsvLoader::load_fuel_prices(&path).unwrap();
        assert_eq!(points.len(), 1);
        assert!(points[0].e85.is_nan());
        assert_eq!(points[0].price_95_e10, 1.85);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let path = env::temp_dir().join("fuel_price_charts_does_not_exist.csv");
        let err = CsvLoader::load_fuel_prices(&path).unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(p) if p == path));
    }

    #[test]
    fn test_empty_file_yields_no_records() {
        let path = write_temp("fuel_price_charts_loader_empty.csv", "");
        assert!(CsvLoader::load_fuel_prices(&path).unwrap().is_empty());
        assert!(CsvLoader::load_charging_prices(&path, &RechargeOffsets::default())
            .unwrap()
            .is_empty());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_charging_dates_are_shifted_per_category() {
        let path = write_temp(
            "fuel_price_charts_loader_charging.csv",
            "DT_MESURE,PTTC_HFA,TYPE_RECHARGE\n\
             2023-06,0.42,Normale\n\
             2023-06,0.51,Rapide\n\
             2023-06,0.59,Ultra-Rapide\n\
             2023-06,0.30,Lente\n",
        );

        let points = CsvLoader::load_charging_prices(&path, &RechargeOffsets::default()).unwrap();
        let days: Vec<u32> = points.iter().map(|p| p.date.unwrap().day()).collect();
        assert_eq!(days, vec![1, 8, 15, 1]);
        assert_eq!(points[1].category, "Rapide");
        assert_eq!(points[2].price_per_kwh, 0.59);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_charging_bad_date_stays_none() {
        let path = write_temp(
            "fuel_price_charts_loader_charging_bad.csv",
            "DT_MESURE,PTTC_HFA,TYPE_RECHARGE\n06/2023,0.42,Rapide\n",
        );

        let points = CsvLoader::load_charging_prices(&path, &RechargeOffsets::default()).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].date, None);
        assert_eq!(points[0].price_per_kwh, 0.42);

        fs::remove_file(&path).unwrap();
    }
}
