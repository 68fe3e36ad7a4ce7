use std::{fs, path::{Path, PathBuf}};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{acs::{NumberFormat, KEY}, geom::HALF_MILE_M, transit::{BusSchema, RailSchema}};

/// Input locations and schema conventions for one pipeline run.
/// Every field has a default, so a JSON config only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Folder holding the ACS CSV tables.
    pub acs_dir: PathBuf,
    /// Block-group polygons (`.shp` or `.geojson`).
    pub blocks: PathBuf,
    pub bus_stops: PathBuf,
    pub rail_stops: PathBuf,
    /// Block-group key attribute in the polygon file.
    pub key_field: String,
    pub buffer_radius_m: f64,
    /// How numbers are written inside ACS column names.
    pub number_format: NumberFormat,
    pub rail: RailSchema,
    pub bus: BusSchema,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            acs_dir: "data/ACS".into(),
            blocks: "data/block_groups.shp".into(),
            bus_stops: "data/bus_stops.geojson".into(),
            rail_stops: "data/rail_stops.csv".into(),
            key_field: KEY.into(),
            buffer_radius_m: HALF_MILE_M,
            number_format: NumberFormat::default(),
            rail: RailSchema::default(),
            bus: BusSchema::default(),
        }
    }
}

impl PipelineConfig {
    /// Read a config from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read config file: {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("[config] Invalid config file: {}", path.display()))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        ensure!(config.buffer_radius_m > 0.0, "buffer_radius_m must be positive");
        Ok(config)
    }
}
