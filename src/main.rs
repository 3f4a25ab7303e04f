//! Fuel Price Charts - CLI entry point
//!
//! Loads the price feeds, computes vehicle costs and writes the SVG charts in one pass.

use anyhow::{Context, Result};
use clap::Parser;
use fuel_price_charts::charts::ChartRenderer;
use fuel_price_charts::config::AppConfig;
use fuel_price_charts::data::{CsvLoader, E85Aggregator};
use fuel_price_charts::report::RunReport;
use fuel_price_charts::stats::{sort_by_cost_desc, CostCalculator, PriceSummary, VehicleCostEntry};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fuel-price-charts")]
#[command(about = "Fuel price trends and vehicle cost-per-100km charts", long_about = None)]
struct Cli {
    /// Monthly fuel price CSV (date, prix95E10, prix98E10, prixGazole, prixElec, prixE85)
    #[arg(long, value_name = "FILE")]
    prices: PathBuf,

    /// Public charging price CSV (DT_MESURE, PTTC_HFA, TYPE_RECHARGE)
    #[arg(long, value_name = "FILE")]
    charging: PathBuf,

    /// Raw per-station E85 quotes (';' separated) used to fill missing E85 prices
    #[arg(long, value_name = "FILE")]
    e85: Option<PathBuf>,

    /// JSON config with the vehicle catalog and recharge offsets
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory the SVG charts are written to
    #[arg(short, long, default_value = "charts")]
    out_dir: PathBuf,

    /// Print costs and price summaries as JSON on stdout
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Drop vehicles with an unknown fuel category instead of failing
    #[arg(long, default_value_t = false)]
    skip_unmapped: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AppConfig::default(),
    };

    let mut prices = CsvLoader::load_fuel_prices(&cli.prices)
        .with_context(|| format!("loading fuel prices {}", cli.prices.display()))?;
    let charging = CsvLoader::load_charging_prices(&cli.charging, &config.recharge_offsets)
        .with_context(|| format!("loading charging prices {}", cli.charging.display()))?;

    let e85_months = match &cli.e85 {
        Some(path) => {
            let monthly = E85Aggregator::load_monthly(path)
                .with_context(|| format!("loading E85 quotes {}", path.display()))?;
            prices = E85Aggregator::fill_missing(&prices, &monthly);
            monthly
        }
        None => Vec::new(),
    };

    let mut costs: Vec<VehicleCostEntry> = if cli.skip_unmapped {
        CostCalculator::compute_mapped_costs(&config.vehicles, &prices)
            .context("computing vehicle costs")?
    } else {
        CostCalculator::compute_costs(&config.vehicles, &prices)
            .context("computing vehicle costs (--skip-unmapped ignores unknown fuel categories)")?
    };
    sort_by_cost_desc(&mut costs);

    let summaries = PriceSummary::all(&prices);
    for summary in &summaries {
        info!(
            category = %summary.category,
            latest = summary.latest,
            mean = summary.mean,
            change = summary.change,
            "Price summary"
        );
    }

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating {}", cli.out_dir.display()))?;
    let written = ChartRenderer::render_all(&prices, &costs, &charging, &cli.out_dir)
        .with_context(|| format!("rendering charts into {}", cli.out_dir.display()))?;

    if cli.json {
        let report = RunReport {
            costs: &costs,
            summaries: &summaries,
            e85_months: &e85_months,
        };
        println!("{}", report.to_json().context("serializing report")?);
    }

    info!(
        out_dir = %cli.out_dir.display(),
        charts = written.len(),
        vehicles = costs.len(),
        "Charts generated"
    );
    Ok(())
}
