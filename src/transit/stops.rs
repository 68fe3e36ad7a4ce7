use std::path::Path;

use anyhow::{anyhow, bail, ensure, Context, Result};
use geo::{Coord, Geometry, Point};
use polars::prelude::DataType;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{geom::{MetricCrs, Reprojector}, io::{csv::read_csv, geojson::{read_geojson, GeoJsonFeature}}};

/// Stop files are published in lon/lat on WGS84.
const STOPS_EPSG: u32 = 4326;

/// A transit stop location in the metric CRS. Bus stops carry the route they were expanded for.
#[derive(Debug, Clone, PartialEq)]
pub struct StopRecord {
    pub stop_num: i64,
    pub name: String,
    pub route: Option<String>,
    pub location: Point<f64>,
}

/// Column names of the rail-stop CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RailSchema {
    pub id_field: String,
    pub name_field: String,
    /// Textual `(lat, lon)` / `[lat, lon]` pair.
    pub location_field: String,
}

impl Default for RailSchema {
    fn default() -> Self {
        Self {
            id_field: "STOP_ID".into(),
            name_field: "STOP_NAME".into(),
            location_field: "Location".into(),
        }
    }
}

/// Property names of the bus-stop GeoJSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusSchema {
    pub id_field: String,
    pub name_field: String,
    /// Comma-separated list of routes serving the stop.
    pub routes_field: String,
    pub status_field: String,
    /// Value of `status_field` for stops in service.
    pub active_status: String,
}

impl Default for BusSchema {
    fn default() -> Self {
        Self {
            id_field: "SYSTEMSTOP".into(),
            name_field: "PUBLIC_NAM".into(),
            routes_field: "ROUTESSTPG".into(),
            status_field: "STATUS".into(),
            active_status: "1".into(),
        }
    }
}

/// Parse a `(lat, lon)` or `[lat, lon]` pair into a lon/lat coordinate.
pub fn parse_lat_lon(text: &str) -> Result<Coord<f64>> {
    let inner = text.trim()
        .trim_start_matches(['(', '['])
        .trim_end_matches([')', ']']);
    let (lat, lon) = inner.split_once(',')
        .ok_or_else(|| anyhow!("expected a lat/lon pair, got {text:?}"))?;
    let lat: f64 = lat.trim().parse().with_context(|| format!("invalid latitude in {text:?}"))?;
    let lon: f64 = lon.trim().parse().with_context(|| format!("invalid longitude in {text:?}"))?;
    ensure!((-90.0..=90.0).contains(&lat), "latitude out of range in {text:?}");
    Ok(Coord { x: lon, y: lat })
}

/// Load rail stops from CSV, reprojected to `crs`. Rows without a location are dropped.
pub fn load_rail_stops(path: &Path, schema: &RailSchema, crs: &MetricCrs) -> Result<Vec<StopRecord>> {
    let df = read_csv(path)?;
    let column = |name: &str, dtype: DataType| df.column(name)
        .with_context(|| format!("[transit::stops] rail stops are missing column {name:?}"))?
        .cast(&dtype)
        .with_context(|| format!("[transit::stops] rail column {name:?} has the wrong type"));

    let ids = column(&schema.id_field, DataType::Int64)?;
    let names = column(&schema.name_field, DataType::String)?;
    let locations = column(&schema.location_field, DataType::String)?;
    let reproject = crs.reprojector(STOPS_EPSG)?;

    let mut stops = Vec::with_capacity(df.height());
    let mut dropped = 0;
    for ((id, name), location) in ids.i64()?.into_iter().zip(names.str()?).zip(locations.str()?) {
        let Some(location) = location.filter(|s| !s.trim().is_empty()) else { dropped += 1; continue };
        let stop_num = id.ok_or_else(|| anyhow!("[transit::stops] rail stop without a valid {}", schema.id_field))?;
        let coord = parse_lat_lon(location)
            .with_context(|| format!("[transit::stops] rail stop {stop_num}"))?;
        stops.push(StopRecord {
            stop_num,
            name: name.unwrap_or_default().to_string(),
            route: None,
            location: Point(reproject.coord(coord)?),
        });
    }

    if dropped > 0 { warn!(dropped, "rail stops without a location were dropped") }
    info!(stops = stops.len(), "loaded rail stops");
    Ok(stops)
}

/// Load active bus stops from GeoJSON, one record per (stop, route), reprojected to `crs`.
pub fn load_bus_stops(path: &Path, schema: &BusSchema, crs: &MetricCrs) -> Result<Vec<StopRecord>> {
    let features = read_geojson(path)?;
    let reproject = crs.reprojector(STOPS_EPSG)?;

    let mut stops = Vec::new();
    let (mut inactive, mut no_geometry) = (0, 0);
    for feature in &features {
        if feature.geometry.is_none() { no_geometry += 1; continue }
        let expanded = expand_bus_stop(feature, schema, &reproject)?;
        if expanded.is_empty() { inactive += 1 }
        stops.extend(expanded);
    }

    if no_geometry > 0 { warn!(no_geometry, "bus stops without geometry were dropped") }
    if inactive > 0 { warn!(inactive, "bus stops out of service or without routes were dropped") }
    info!(stops = features.len() - inactive - no_geometry, records = stops.len(), "loaded bus stops");
    Ok(stops)
}

/// One record per route token of an active stop; nothing for inactive or unrouted stops.
fn expand_bus_stop(feature: &GeoJsonFeature, schema: &BusSchema, reproject: &Reprojector) -> Result<Vec<StopRecord>> {
    if feature.text(&schema.status_field).as_deref() != Some(schema.active_status.as_str()) {
        return Ok(vec![])
    }
    let routes = feature.text(&schema.routes_field).unwrap_or_default();
    let routes = routes.split(',').map(str::trim).filter(|r| !r.is_empty()).collect::<Vec<_>>();
    if routes.is_empty() { return Ok(vec![]) }

    let id = feature.text(&schema.id_field)
        .ok_or_else(|| anyhow!("[transit::stops] bus stop is missing {}", schema.id_field))?;
    let stop_num: i64 = id.parse()
        .with_context(|| format!("[transit::stops] bus stop id {id:?} is not an integer"))?;
    let location = match &feature.geometry {
        Some(Geometry::Point(point)) => Point(reproject.coord(point.0)?),
        Some(_) => bail!("[transit::stops] bus stop {stop_num} is not a point"),
        None => bail!("[transit::stops] bus stop {stop_num} has no geometry"),
    };
    let name = feature.text(&schema.name_field).unwrap_or_default();

    Ok(routes.into_iter()
        .map(|route| StopRecord { stop_num, name: name.clone(), route: Some(route.to_string()), location })
        .collect())
}
