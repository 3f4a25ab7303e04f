//! Price Records Module
//! Typed rows produced by the CSV loaders and the fuel category lookup table.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A priced commodity with its own column in the fuel price feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelCategory {
    E95,
    E98,
    Diesel,
    Electric,
    E85,
}

impl FuelCategory {
    /// Label ↔ category table. Catalog entries are resolved against it.
    pub const ALL: [FuelCategory; 5] = [
        FuelCategory::E95,
        FuelCategory::E98,
        FuelCategory::Diesel,
        FuelCategory::Electric,
        FuelCategory::E85,
    ];

    /// Label used in vehicle catalogs and chart legends.
    pub fn label(self) -> &'static str {
        match self {
            FuelCategory::E95 => "95-E10",
            FuelCategory::E98 => "98-E10",
            FuelCategory::Diesel => "Diesel",
            FuelCategory::Electric => "Electric",
            FuelCategory::E85 => "E85",
        }
    }

    /// Column holding this category in the fuel price CSV.
    pub fn column(self) -> &'static str {
        match self {
            FuelCategory::E95 => "prix95E10",
            FuelCategory::E98 => "prix98E10",
            FuelCategory::Diesel => "prixGazole",
            FuelCategory::Electric => "prixElec",
            FuelCategory::E85 => "prixE85",
        }
    }

    /// Resolve a catalog label. Matching is exact.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for FuelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One month of the fuel price feed. Prices are NaN when the cell was absent or unparsable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelPricePoint {
    pub date: Option<NaiveDate>,
    pub price_95_e10: f64,
    pub price_98_e10: f64,
    pub diesel: f64,
    pub electricity: f64,
    pub e85: f64,
}

impl FuelPricePoint {
    /// A point with every price missing.
    pub fn empty(date: Option<NaiveDate>) -> Self {
        Self {
            date,
            price_95_e10: f64::NAN,
            price_98_e10: f64::NAN,
            diesel: f64::NAN,
            electricity: f64::NAN,
            e85: f64::NAN,
        }
    }

    /// Unit price for a category.
    pub fn price(&self, category: FuelCategory) -> f64 {
        match category {
            FuelCategory::E95 => self.price_95_e10,
            FuelCategory::E98 => self.price_98_e10,
            FuelCategory::Diesel => self.diesel,
            FuelCategory::Electric => self.electricity,
            FuelCategory::E85 => self.e85,
        }
    }

    pub(crate) fn price_mut(&mut self, category: FuelCategory) -> &mut f64 {
        match category {
            FuelCategory::E95 => &mut self.price_95_e10,
            FuelCategory::E98 => &mut self.price_98_e10,
            FuelCategory::Diesel => &mut self.diesel,
            FuelCategory::Electric => &mut self.electricity,
            FuelCategory::E85 => &mut self.e85,
        }
    }

    /// True when at least one price could not be parsed.
    pub fn is_partial(&self) -> bool {
        FuelCategory::ALL.iter().any(|&c| self.price(c).is_nan())
    }
}

/// Average public charging price for one month and one recharge speed tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargingStationPricePoint {
    /// First of the month, shifted by the category offset.
    pub date: Option<NaiveDate>,
    pub price_per_kwh: f64,
    pub category: String,
}

/// Day offset applied to one recharge category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RechargeOffset {
    pub category: String,
    pub days: u64,
}

/// Category → day offset table used to separate same-month charging bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RechargeOffsets(pub Vec<RechargeOffset>);

impl Default for RechargeOffsets {
    fn default() -> Self {
        Self(vec![
            RechargeOffset {
                category: "Normale".to_string(),
                days: 0,
            },
            RechargeOffset {
                category: "Rapide".to_string(),
                days: 7,
            },
            RechargeOffset {
                category: "Ultra-Rapide".to_string(),
                days: 14,
            },
        ])
    }
}

impl RechargeOffsets {
    /// Offset for a category, by exact string equality.
    pub fn days_for(&self, category: &str) -> Option<u64> {
        self.0
            .iter()
            .find(|o| o.category == category)
            .map(|o| o.days)
    }

    /// Shift a month date for the given category. Unknown categories are not shifted.
    pub fn shift(&self, date: NaiveDate, category: &str) -> NaiveDate {
        let days = self.days_for(category).unwrap_or(0);
        date.checked_add_days(Days::new(days)).unwrap_or(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_round_trips_through_its_label() {
        for category in FuelCategory::ALL {
            assert_eq!(FuelCategory::from_label(category.label()), Some(category));
        }
    }

    #[test]
    fn test_label_lookup_is_exact() {
        assert_eq!(FuelCategory::from_label("electric"), None);
        assert_eq!(FuelCategory::from_label("95 E10"), None);
        assert_eq!(FuelCategory::from_label(""), None);
    }

    #[test]
    fn test_columns_are_distinct() {
        let mut columns: Vec<_> = FuelCategory::ALL.iter().map(|c| c.column()).collect();
        columns.sort();
        columns.dedup();
        assert_eq!(columns.len(), FuelCategory::ALL.len());
    }

    #[test]
    fn test_price_accessor_matches_fields() {
        let point = FuelPricePoint {
            date: None,
            price_95_e10: 1.0,
            price_98_e10: 2.0,
            diesel: 3.0,
            electricity: 4.0,
            e85: 5.0,
        };
        assert_eq!(point.price(FuelCategory::E95), 1.0);
        assert_eq!(point.price(FuelCategory::E98), 2.0);
        assert_eq!(point.price(FuelCategory::Diesel), 3.0);
        assert_eq!(point.price(FuelCategory::Electric), 4.0);
        assert_eq!(point.price(FuelCategory::E85), 5.0);
        assert!(!point.is_partial());
        assert!(FuelPricePoint::empty(None).is_partial());
    }

    #[test]
    fn test_default_offsets() {
        let offsets = RechargeOffsets::default();
        let month = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        assert_eq!(offsets.shift(month, "Normale"), month);
        assert_eq!(
            offsets.shift(month, "Rapide"),
            NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()
        );
        assert_eq!(
            offsets.shift(month, "Ultra-Rapide"),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }

    #[test]
    fn test_offsets_match_strictly() {
        let offsets = RechargeOffsets::default();
        let month = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        assert_eq!(offsets.days_for("rapide"), None);
        assert_eq!(offsets.days_for("Ultra-rapide"), None);
        assert_eq!(offsets.shift(month, "Rapide "), month);
    }
}
