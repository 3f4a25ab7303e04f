//! E85 Aggregation Module
//! Turns the raw per-station E85 quote dump into one mean price per month.

use crate::data::loader::{CsvLoader, LoaderError};
use crate::data::records::FuelPricePoint;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

pub const QUOTE_TIME_COL: &str = "prix_maj";
pub const QUOTE_VALUE_COL: &str = "prix_valeur";
pub const QUOTE_NAME_COL: &str = "prix_nom";

/// Fuel name kept from the dump.
pub const E85_NAME: &str = "E85";

/// One station quote that survived cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelQuote {
    pub updated_at: DateTime<Utc>,
    pub price: f64,
    pub name: String,
}

/// Mean E85 price over one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPrice {
    /// First day of the month.
    pub month: NaiveDate,
    pub mean_price: f64,
    pub samples: usize,
}

pub struct E85Aggregator;

impl E85Aggregator {
    /// Load the `;` separated dump and aggregate its E85 quotes by month, most recent first.
    pub fn load_monthly(path: &Path) -> Result<Vec<MonthlyPrice>, LoaderError> {
        let df = CsvLoader::read_frame(path, b';')?;
        let times = CsvLoader::text_column(&df, QUOTE_TIME_COL)?;
        let prices = CsvLoader::price_column(&df, QUOTE_VALUE_COL)?;
        let names = CsvLoader::text_column(&df, QUOTE_NAME_COL)?;

        let rows: Vec<Option<FuelQuote>> = times
            .into_iter()
            .zip(prices)
            .zip(names)
            .map(|((time, price), name)| {
                let updated_at = time
                    .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
                    .map(|dt| dt.with_timezone(&Utc))?;
                if price.is_nan() {
                    return None;
                }
                Some(FuelQuote {
                    updated_at,
                    price,
                    name: name?,
                })
            })
            .collect();

        let total = rows.len();
        let quotes: Vec<FuelQuote> = rows.into_iter().flatten().collect();
        debug!(total, kept = quotes.len(), "E85 dump cleaned");

        let monthly = Self::monthly_means(&quotes);
        info!(months = monthly.len(), "E85 monthly means computed");
        Ok(monthly)
    }

    /// Group E85 quotes by UTC calendar month and average them.
    pub fn monthly_means(quotes: &[FuelQuote]) -> Vec<MonthlyPrice> {
        let mut buckets: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for quote in quotes.iter().filter(|q| q.name == E85_NAME) {
            let Some(month) = first_of_month(quote.updated_at.date_naive()) else {
                continue;
            };
            let entry = buckets.entry(month).or_insert((0.0, 0));
            entry.0 += quote.price;
            entry.1 += 1;
        }

        buckets
            .into_iter()
            .rev()
            .map(|(month, (sum, samples))| MonthlyPrice {
                month,
                mean_price: sum / samples as f64,
                samples,
            })
            .collect()
    }

    /// Copy of `points` where each missing E85 price is taken from the matching month.
    pub fn fill_missing(points: &[FuelPricePoint], monthly: &[MonthlyPrice]) -> Vec<FuelPricePoint> {
        let by_month: BTreeMap<NaiveDate, f64> =
            monthly.iter().map(|m| (m.month, m.mean_price)).collect();

        points
            .iter()
            .map(|point| {
                let mut point = point.clone();
                if point.e85.is_nan() {
                    if let Some(price) = point.date.and_then(|d| by_month.get(&d)) {
                        point.e85 = *price;
                    }
                }
                point
            })
            .collect()
    }
}

fn first_of_month(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_month;
    use std::{env, fs};

    fn quote(ts: &str, price: f64, name: &str) -> FuelQuote {
        FuelQuote {
            updated_at: DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc),
            price,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_monthly_means_only_average_e85() {
        let quotes = vec![
            quote("2024-01-03T08:35:20+01:00", 1.00, "E85"),
            quote("2024-01-20T10:00:00+01:00", 1.20, "E85"),
            quote("2024-01-21T10:00:00+01:00", 1.05, "GPLc"),
            quote("2024-02-02T10:00:00+01:00", 0.90, "E85"),
        ];

        let monthly = E85Aggregator::monthly_means(&quotes);
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].month, parse_month("2024-02").unwrap());
        assert_eq!(monthly[0].samples, 1);
        assert_eq!(monthly[1].month, parse_month("2024-01").unwrap());
        assert_eq!(monthly[1].samples, 2);
        assert!((monthly[1].mean_price - 1.10).abs() < 1e-9);
    }

    #[test]
    fn test_month_boundary_uses_utc() {
        // 00:30 on Feb 1st in Paris is still January in UTC.
        let quotes = vec![quote("2024-02-01T00:30:00+01:00", 1.0, "E85")];
        let monthly = E85Aggregator::monthly_means(&quotes);
        assert_eq!(monthly[0].month, parse_month("2024-01").unwrap());
    }

    #[test]
    fn test_fill_missing_only_touches_nan() {
        let mut known = FuelPricePoint::empty(parse_month("2024-01"));
        known.e85 = 0.5;
        let missing = FuelPricePoint::empty(parse_month("2024-02"));
        let unmatched = FuelPricePoint::empty(parse_month("2023-12"));
        let points = vec![missing, known, unmatched];

        let monthly = vec![
            MonthlyPrice {
                month: parse_month("2024-02").unwrap(),
                mean_price: 0.95,
                samples: 3,
            },
            MonthlyPrice {
                month: parse_month("2024-01").unwrap(),
                mean_price: 0.99,
                samples: 2,
            },
        ];

        let filled = E85Aggregator::fill_missing(&points, &monthly);
        assert_eq!(filled[0].e85, 0.95);
        assert_eq!(filled[1].e85, 0.5);
        assert!(filled[2].e85.is_nan());
        assert!(points[0].e85.is_nan());
    }

    #[test]
    fn test_load_monthly_drops_incomplete_rows() {
        let path = env::temp_dir().join("fuel_price_charts_e85_dump.csv");
        fs::write(
            &path,
            "id;prix_maj;prix_nom;prix_valeur\n\
             1;2024-01-03T08:35:20+01:00;E85;0.999\n\
             2;2024-01-10T08:35:20+01:00;E85;\n\
             3;not-a-date;E85;0.5\n\
             4;2024-01-12T08:35:20+01:00;GPLc;0.98\n\
             5;2024-01-15T08:35:20+01:00;E85;1.001\n",
        )
        .unwrap();

        let monthly = E85Aggregator::load_monthly(&path).unwrap();
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].samples, 2);
        assert!((monthly[0].mean_price - 1.0).abs() < 1e-9);

        fs::remove_file(&path).unwrap();
    }
}
