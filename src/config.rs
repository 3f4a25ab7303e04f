//! Application configuration: vehicle catalog and recharge offset table.

use crate::data::{FuelCategory, RechargeOffsets};
use crate::stats::VehicleSpec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Vehicle '{vehicle}' must have a positive consumption")]
    InvalidConsumption { vehicle: String },
}

/// Declarative tables passed into the loader and calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub vehicles: Vec<VehicleSpec>,
    pub recharge_offsets: RechargeOffsets,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            vehicles: default_catalog(),
            recharge_offsets: RechargeOffsets::default(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a JSON config. Omitted keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            vehicles = config.vehicles.len(),
            offsets = config.recharge_offsets.0.len(),
            "Config loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self
            .vehicles
            .iter()
            .find(|v| !(v.consumption > 0.0 && v.consumption.is_finite()))
        {
            Some(v) => Err(ConfigError::InvalidConsumption {
                vehicle: v.name.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Built-in vehicle catalog.
pub fn default_catalog() -> Vec<VehicleSpec> {
    use FuelCategory::*;
    vec![
        VehicleSpec::new("Tesla Model S", 17.5, Electric),
        VehicleSpec::new("Renault Zoé", 15.7, Electric),
        VehicleSpec::new("Peugeot 208", 5.6, E95),
        VehicleSpec::new("Peugeot 308", 5.2, Diesel),
        VehicleSpec::new("Citroën C3", 4.7, E85),
        VehicleSpec::new("Audi RS6", 14.3, E85),
        VehicleSpec::new("Porsche 911", 12.7, E98),
        VehicleSpec::new("Mercedes EQS Berline", 17.3, Electric),
        VehicleSpec::new("Ferrari F40", 12.4, E98),
        VehicleSpec::new("Ford Fiesta", 6.0, E85),
    ]
}
