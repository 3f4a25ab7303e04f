//! Static Chart Renderer
//! Writes the three comparison views as SVG files.
//!
//! Charts:
//! 1. Price trends: one line per fuel category over time
//! 2. Vehicle costs: horizontal bars, cost per 100 km, in the given order
//! 3. Charging stations: monthly bars colored by recharge speed tier

use crate::data::{ChargingStationPricePoint, FuelCategory, FuelPricePoint};
use crate::stats::{PriceSummary, VehicleCostEntry};
use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

// Line colors (price trends)
const MAGENTA_LINE: RGBColor = RGBColor(255, 0, 255); // 95-E10
const GREEN_LINE: RGBColor = RGBColor(0, 128, 0); // 98-E10
const RED_LINE: RGBColor = RGBColor(255, 0, 0); // Diesel
const STEELBLUE_LINE: RGBColor = RGBColor(70, 130, 180); // Electricity
const ORANGE_LINE: RGBColor = RGBColor(255, 165, 0); // E85

// Bar colors
const COST_BAR: RGBColor = RGBColor(0x82, 0xCE, 0xEB);
const RAPIDE_BAR: RGBColor = RGBColor(0x82, 0xCE, 0xEB);
const ULTRA_RAPIDE_BAR: RGBColor = RGBColor(0x84, 0x89, 0xEB);
const NORMALE_BAR: RGBColor = RGBColor(0x84, 0xEB, 0xC4);

const TREND_SIZE: (u32, u32) = (900, 400);
const COST_SIZE: (u32, u32) = (700, 400);
const CHARGING_SIZE: (u32, u32) = (1000, 450);

/// Width of one charging bar, in days. Bars of the same month are 7 days apart.
const CHARGING_BAR_DAYS: f64 = 6.0;

pub const CHARGING_TITLE: &str = "Prix moyen de l'électricité des stations de recharge publiques";

pub const PRICE_TRENDS_FILE: &str = "price_trends.svg";
pub const VEHICLE_COSTS_FILE: &str = "vehicle_costs.svg";
pub const CHARGING_STATIONS_FILE: &str = "charging_stations.svg";

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("No {0} to draw")]
    NoData(&'static str),
    #[error("Drawing failed: {0}")]
    Drawing(String),
}

fn drawing_error<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Drawing(err.to_string())
}

/// Line color of a fuel category.
pub fn trend_color(category: FuelCategory) -> RGBColor {
    match category {
        FuelCategory::E95 => MAGENTA_LINE,
        FuelCategory::E98 => GREEN_LINE,
        FuelCategory::Diesel => RED_LINE,
        FuelCategory::Electric => STEELBLUE_LINE,
        FuelCategory::E85 => ORANGE_LINE,
    }
}

/// Legend tier of a recharge category. Unknown categories are drawn as "Normale".
pub fn recharge_tier(category: &str) -> &'static str {
    match category {
        "Rapide" => "Rapide",
        "Ultra-Rapide" => "Ultra-Rapide",
        _ => "Normale",
    }
}

/// Bar color of a recharge category.
pub fn recharge_color(category: &str) -> RGBColor {
    match recharge_tier(category) {
        "Rapide" => RAPIDE_BAR,
        "Ultra-Rapide" => ULTRA_RAPIDE_BAR,
        _ => NORMALE_BAR,
    }
}

fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn month_label(x: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%b '%y").to_string())
        .unwrap_or_default()
}

/// Turn a `NoData` outcome into a skipped chart; other errors still fail.
fn written_or_skipped(
    result: Result<(), ChartError>,
    path: PathBuf,
) -> Result<Option<PathBuf>, ChartError> {
    match result {
        Ok(()) => Ok(Some(path)),
        Err(ChartError::NoData(what)) => {
            warn!(path = %path.display(), "No {what} to draw, chart skipped");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

pub struct ChartRenderer;

impl ChartRenderer {
    /// Render the three charts into `out_dir`. An empty input skips its chart only.
    /// Returns the paths actually written.
    pub fn render_all(
        prices: &[FuelPricePoint],
        costs: &[VehicleCostEntry],
        charging: &[ChargingStationPricePoint],
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>, ChartError> {
        let trends = out_dir.join(PRICE_TRENDS_FILE);
        let vehicles = out_dir.join(VEHICLE_COSTS_FILE);
        let stations = out_dir.join(CHARGING_STATIONS_FILE);

        let written = [
            written_or_skipped(Self::render_price_trends(prices, &trends), trends)?,
            written_or_skipped(Self::render_vehicle_costs(costs, &vehicles), vehicles)?,
            written_or_skipped(Self::render_charging_stations(charging, &stations), stations)?,
        ];
        Ok(written.into_iter().flatten().collect())
    }

    /// Price trend lines. Undated points and NaN prices are skipped.
    pub fn render_price_trends(points: &[FuelPricePoint], path: &Path) -> Result<(), ChartError> {
        let mut dated: Vec<(f64, &FuelPricePoint)> = points
            .iter()
            .filter_map(|p| p.date.map(|d| (day_number(d), p)))
            .collect();
        if dated.is_empty() {
            return Err(ChartError::NoData("fuel prices"));
        }
        dated.sort_by(|a, b| a.0.total_cmp(&b.0));

        let x_min = dated[0].0;
        let x_max = dated[dated.len() - 1].0.max(x_min + 1.0);
        let y_max = match PriceSummary::chart_max(points) {
            max if max > 0.0 => max,
            _ => 1.0,
        };

        let root = SVGBackend::new(path, TREND_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(drawing_error)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption("Prix des carburants et de l'électricité", ("sans-serif", 18))
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, 0f64..y_max)
            .map_err(drawing_error)?;

        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&|x| month_label(*x))
            .y_desc("€")
            .draw()
            .map_err(drawing_error)?;

        for category in FuelCategory::ALL {
            let color = trend_color(category);
            let series: Vec<(f64, f64)> = dated
                .iter()
                .map(|(x, p)| (*x, p.price(category)))
                .filter(|(_, v)| !v.is_nan())
                .collect();
            if series.is_empty() {
                continue;
            }

            chart
                .draw_series(LineSeries::new(series, color.stroke_width(2)))
                .map_err(drawing_error)?
                .label(category.label())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(drawing_error)?;

        root.present().map_err(drawing_error)?;
        info!(path = %path.display(), points = dated.len(), "Price trend chart written");
        Ok(())
    }

    /// Horizontal cost bars, first entry on top. NaN costs are left out.
    pub fn render_vehicle_costs(entries: &[VehicleCostEntry], path: &Path) -> Result<(), ChartError> {
        let drawable: Vec<&VehicleCostEntry> = entries
            .iter()
            .filter(|e| {
                if e.cost_per_100km.is_nan() {
                    warn!(vehicle = %e.label, "No price for vehicle, bar skipped");
                }
                !e.cost_per_100km.is_nan()
            })
            .collect();
        if drawable.is_empty() {
            return Err(ChartError::NoData("vehicle costs"));
        }

        let n = drawable.len();
        let x_max = match drawable.iter().map(|e| e.cost_per_100km).fold(0.0, f64::max) {
            max if max > 0.0 => max * 1.1,
            _ => 1.0,
        };
        // Segment 0 is at the bottom, so the first entry gets the last segment.
        let row = |i: usize| n - 1 - i;
        let labels: Vec<String> = (0..n).map(|seg| drawable[n - 1 - seg].label.clone()).collect();

        let root = SVGBackend::new(path, COST_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(drawing_error)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption("Coût pour 100 km", ("sans-serif", 18))
            .x_label_area_size(40)
            .y_label_area_size(200)
            .build_cartesian_2d(0f64..x_max, (0..n).into_segmented())
            .map_err(drawing_error)?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(n)
            .y_label_formatter(&|v| match v {
                SegmentValue::CenterOf(seg) => labels.get(*seg).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .x_desc("€ / 100 km")
            .draw()
            .map_err(drawing_error)?;

        chart
            .draw_series(drawable.iter().enumerate().map(|(i, e)| {
                Rectangle::new(
                    [
                        (0.0, SegmentValue::Exact(row(i))),
                        (e.cost_per_100km, SegmentValue::Exact(row(i) + 1)),
                    ],
                    COST_BAR.filled(),
                )
            }))
            .map_err(drawing_error)?;

        chart
            .draw_series(drawable.iter().enumerate().map(|(i, e)| {
                Text::new(
                    format!("{:.2} €", e.cost_per_100km),
                    (e.cost_per_100km, SegmentValue::CenterOf(row(i))),
                    ("sans-serif", 12).into_font().color(&BLACK),
                )
            }))
            .map_err(drawing_error)?;

        root.present().map_err(drawing_error)?;
        info!(path = %path.display(), vehicles = n, "Vehicle cost chart written");
        Ok(())
    }

    /// Charging-station bars at their shifted dates, one legend entry per speed tier.
    pub fn render_charging_stations(
        points: &[ChargingStationPricePoint],
        path: &Path,
    ) -> Result<(), ChartError> {
        let bars: Vec<(f64, &ChargingStationPricePoint)> = points
            .iter()
            .filter(|p| !p.price_per_kwh.is_nan())
            .filter_map(|p| p.date.map(|d| (day_number(d), p)))
            .collect();
        if bars.is_empty() {
            return Err(ChartError::NoData("charging station prices"));
        }

        let x_min = bars.iter().map(|(x, _)| *x).fold(f64::INFINITY, f64::min);
        let x_max = bars.iter().map(|(x, _)| *x).fold(f64::NEG_INFINITY, f64::max) + CHARGING_BAR_DAYS;
        let y_max = match bars.iter().map(|(_, p)| p.price_per_kwh).fold(0.0, f64::max) {
            max if max > 0.0 => max * 1.1,
            _ => 1.0,
        };

        let root = SVGBackend::new(path, CHARGING_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(drawing_error)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption(CHARGING_TITLE, ("sans-serif", 16))
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, 0f64..y_max)
            .map_err(drawing_error)?;

        chart
            .configure_mesh()
            .x_labels(12)
            .x_label_formatter(&|x| month_label(*x))
            .y_desc("€ / kWh")
            .draw()
            .map_err(drawing_error)?;

        for legend in ["Ultra-Rapide", "Rapide", "Normale"] {
            let color = recharge_color(legend);
            let tier: Vec<(f64, f64)> = bars
                .iter()
                .filter(|(_, p)| recharge_tier(&p.category) == legend)
                .map(|(x, p)| (*x, p.price_per_kwh))
                .collect();
            if tier.is_empty() {
                continue;
            }

            chart
                .draw_series(tier.into_iter().map(|(x, price)| {
                    Rectangle::new([(x, 0.0), (x + CHARGING_BAR_DAYS, price)], color.filled())
                }))
                .map_err(drawing_error)?
                .label(legend)
                .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 12, y + 6)], color.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(drawing_error)?;

        root.present().map_err(drawing_error)?;
        info!(path = %path.display(), bars = bars.len(), "Charging station chart written");
        Ok(())
    }
}
