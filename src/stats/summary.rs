//! Price Summary Module
//! Descriptive statistics over each price series of the trend feed.

use crate::data::{FuelCategory, FuelPricePoint};
use serde::Serialize;
use statrs::statistics::Statistics;

/// Statistics for one fuel category over the whole feed.
#[derive(Debug, Clone, Serialize)]
pub struct PriceSummary {
    pub category: FuelCategory,
    pub valid_count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    /// Most recent valid price.
    pub latest: f64,
    /// Latest minus oldest valid price.
    pub change: f64,
}

impl PriceSummary {
    /// Summarize one category. NaN prices are ignored.
    pub fn for_category(points: &[FuelPricePoint], category: FuelCategory) -> Self {
        let values: Vec<f64> = points
            .iter()
            .map(|p| p.price(category))
            .filter(|v| !v.is_nan())
            .collect();

        let (Some(&latest), Some(&oldest)) = (values.first(), values.last()) else {
            return Self {
                category,
                valid_count: 0,
                min: f64::NAN,
                max: f64::NAN,
                mean: f64::NAN,
                std_dev: f64::NAN,
                latest: f64::NAN,
                change: f64::NAN,
            };
        };

        let std_dev = if values.len() > 1 {
            Statistics::std_dev(values.iter())
        } else {
            0.0
        };

        Self {
            category,
            valid_count: values.len(),
            min: Statistics::min(values.iter()),
            max: Statistics::max(values.iter()),
            mean: Statistics::mean(values.iter()),
            std_dev,
            latest,
            change: latest - oldest,
        }
    }

    /// One summary per category, in table order.
    pub fn all(points: &[FuelPricePoint]) -> Vec<Self> {
        FuelCategory::ALL
            .iter()
            .map(|&c| Self::for_category(points, c))
            .collect()
    }

    /// Highest valid price across every category, 0 for an empty feed.
    pub fn chart_max(points: &[FuelPricePoint]) -> f64 {
        points
            .iter()
            .flat_map(|p| FuelCategory::ALL.map(|c| p.price(c)))
            .filter(|v| !v.is_nan())
            .fold(0.0, f64::max)
    }
}
