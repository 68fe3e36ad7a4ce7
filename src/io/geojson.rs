//! GeoJSON reading for point and polygon layers.

use std::{fs, path::Path};

use anyhow::{anyhow, bail, ensure, Context, Result};
use geo::{Coord, Geometry, LineString, MultiPolygon, Point, Polygon};
use serde_json::{Map, Value};

use super::PolygonFeature;

/// A single GeoJSON feature: its properties and parsed geometry (if not null).
#[derive(Debug, Clone)]
pub(crate) struct GeoJsonFeature {
    pub(crate) properties: Map<String, Value>,
    pub(crate) geometry: Option<Geometry<f64>>,
}

impl GeoJsonFeature {
    /// Get a property rendered as trimmed text. Integral numbers render without a decimal point.
    pub(crate) fn text(&self, field: &str) -> Option<String> {
        match self.properties.get(field)? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => i.to_string(),
                None => n.to_string(),
            }),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Read every feature of a GeoJSON FeatureCollection file.
pub(crate) fn read_geojson(path: &Path) -> Result<Vec<GeoJsonFeature>> {
    let bytes = fs::read(path)
        .with_context(|| format!("[io::geojson] Failed to open GeoJSON file: {}", path.display()))?;
    read_geojson_bytes(&bytes)
        .with_context(|| format!("[io::geojson] Failed to read GeoJSON from {:?}", path))
}

/// Read every feature of a GeoJSON FeatureCollection from bytes.
pub(crate) fn read_geojson_bytes(bytes: &[u8]) -> Result<Vec<GeoJsonFeature>> {
    let value: Value = serde_json::from_slice(bytes).context("Failed to parse GeoJSON bytes")?;
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("GeoJSON is not a FeatureCollection"))?;

    features.iter().enumerate()
        .map(|(idx, feature)| {
            let properties = feature["properties"].as_object().cloned().unwrap_or_default();
            let geometry = match &feature["geometry"] {
                Value::Null => None,
                geometry => Some(parse_geometry(geometry)
                    .with_context(|| format!("invalid geometry in feature {idx}"))?),
            };
            Ok(GeoJsonFeature { properties, geometry })
        })
        .collect()
}

/// Read polygon features from a GeoJSON file, keyed by the `key_field` property.
pub(crate) fn read_polygons_geojson(path: &Path, key_field: &str) -> Result<Vec<PolygonFeature>> {
    read_geojson(path)?.into_iter().enumerate()
        .map(|(idx, feature)| {
            let key = feature.text(key_field)
                .ok_or_else(|| anyhow!("[io::geojson] feature {idx} is missing key field {key_field}"))?;
            let geometry = match feature.geometry {
                None => None,
                Some(Geometry::Polygon(polygon)) => Some(MultiPolygon(vec![polygon])),
                Some(Geometry::MultiPolygon(mp)) => Some(mp),
                Some(_) => bail!("[io::geojson] feature {key} is not a polygon"),
            };
            Ok(PolygonFeature { key, geometry })
        })
        .collect()
}

/// Parse a GeoJSON geometry object (Point, Polygon or MultiPolygon).
fn parse_geometry(geometry: &Value) -> Result<Geometry<f64>> {
    let coords = geometry["coordinates"].as_array()
        .ok_or_else(|| anyhow!("geometry has no coordinates"))?;

    match geometry["type"].as_str() {
        Some("Point") => Ok(Geometry::Point(Point(parse_coord(coords)?))),
        Some("Polygon") => Ok(Geometry::Polygon(parse_polygon_coords(coords)?)),
        Some("MultiPolygon") => Ok(Geometry::MultiPolygon(MultiPolygon(
            coords.iter()
                .map(|polygon| parse_polygon_coords(as_array(polygon)?))
                .collect::<Result<_>>()?
        ))),
        Some(other) => bail!("unsupported geometry type: {other}"),
        None => bail!("geometry has no type"),
    }
}

/// Parse polygon coordinates: [exterior, hole, hole, ...]
fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| parse_ring_coords(as_array(ring)?));
    let exterior = rings.next()
        .ok_or_else(|| anyhow!("polygon is missing its exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Parse a ring from GeoJSON coordinates, closing it if needed.
fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = coords.iter()
        .map(|pair| parse_coord(as_array(pair)?))
        .collect::<Result<Vec<_>>>()?;

    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last { points.push(first) }
    }
    Ok(LineString(points))
}

fn parse_coord(pair: &[Value]) -> Result<Coord<f64>> {
    ensure!(pair.len() >= 2, "coordinate must have at least two values");
    let x = pair[0].as_f64().ok_or_else(|| anyhow!("Invalid coordinate: x must be a number"))?;
    let y = pair[1].as_f64().ok_or_else(|| anyhow!("Invalid coordinate: y must be a number"))?;
    Ok(Coord { x, y })
}

#[inline]
fn as_array(value: &Value) -> Result<&Vec<Value>> {
    value.as_array().ok_or_else(|| anyhow!("expected a coordinate array"))
}
