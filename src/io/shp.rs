//! Shapefile reading for polygon layers.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::{self as shp, dbase::{FieldValue, Record}, Shape};

use super::PolygonFeature;

/// Reads every polygon feature in a `.shp` file, keyed by the `key_field` attribute.
/// Null shapes are kept with an empty geometry so callers can decide how to drop them.
pub(crate) fn read_polygons_shp(path: &Path, key_field: &str) -> Result<Vec<PolygonFeature>> {
    let mut reader = shp::Reader::from_path(path)
        .with_context(|| format!("[io::shp] Failed to open shapefile: {}", path.display()))?;

    let mut features = Vec::with_capacity(reader.shape_count()?);
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result
            .with_context(|| format!("[io::shp] Error reading shape+record in {}", path.display()))?;
        let key = key_from_record(&record, key_field)?;
        let geometry = match shape {
            Shape::NullShape => None,
            Shape::Polygon(polygon) => Some(shp_to_geo(&polygon)),
            other => bail!("[io::shp] Unsupported shape type {:?} for feature {key}", other.shapetype()),
        };
        features.push(PolygonFeature { key, geometry });
    }
    Ok(features)
}

/// Get the key attribute of a record as text, whether stored as characters or a number.
fn key_from_record(record: &Record, field: &str) -> Result<String> {
    match record.get(field) {
        Some(FieldValue::Character(Some(s))) => Ok(s.trim().to_string()),
        Some(FieldValue::Numeric(Some(n))) => Ok(format!("{n:.0}")),
        _ => bail!("[io::shp] missing or invalid key field: {}", field),
    }
}

/// Detect the EPSG code of a shapefile's geographic CRS from its sibling `.prj` file.
/// Returns `None` when there is no `.prj`; projected CRS definitions are rejected.
pub(crate) fn epsg_from_prj(path: &Path) -> Result<Option<u32>> {
    let prj = path.with_extension("prj");
    if !prj.exists() { return Ok(None) }

    let wkt = fs::read_to_string(&prj)
        .with_context(|| format!("[io::shp] Failed to read {}", prj.display()))?;
    epsg_from_wkt(&wkt)
        .with_context(|| format!("[io::shp] Unsupported CRS in {}", prj.display()))
        .map(Some)
}

fn epsg_from_wkt(wkt: &str) -> Result<u32> {
    let wkt = wkt.trim_start().to_ascii_uppercase();
    if wkt.starts_with("PROJCS") { bail!("projected CRS are not supported, expected lon/lat") }
    if !wkt.starts_with("GEOGCS") { bail!("unrecognized WKT definition") }

    let nad83 = ["NAD_1983", "NAD83", "NORTH_AMERICAN_1983", "NORTH_AMERICAN_DATUM_1983"];
    if nad83.iter().any(|name| wkt.contains(name)) {
        Ok(4269)
    } else if wkt.contains("WGS_1984") || wkt.contains("WGS84") || wkt.contains("WGS 84") {
        Ok(4326)
    } else {
        bail!("unknown datum")
    }
}

/// Convert shapefile::Polygon to geo::MultiPolygon<f64>
fn shp_to_geo(p: &shp::Polygon) -> MultiPolygon<f64> {
    /// Ensure first and last are the same for geo::LineString coords
    fn ensure_closed(coords: &mut Vec<Coord<f64>>) {
        if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
            if first != last { coords.push(first) }
        }
    }

    /// Get the signed area of a geo::Coord list (negative for clockwise)
    fn signed_area(pts: &[Coord<f64>]) -> f64 {
        pts.windows(2).map(|w| w[0].x * w[1].y - w[1].x * w[0].y).sum::<f64>() / 2.0
    }

    // Shapefile stores each clockwise exterior followed by its counter-clockwise holes.
    let mut polys: Vec<Polygon<f64>> = Vec::new();
    let mut exterior: Option<LineString<f64>> = None;
    let mut holes: Vec<LineString<f64>> = Vec::new();

    for ring in p.rings() {
        let mut coords: Vec<Coord<f64>> = ring.points().iter()
            .map(|pt| Coord { x: pt.x, y: pt.y })
            .collect();
        ensure_closed(&mut coords);

        if signed_area(&coords) < 0.0 {
            if let Some(ext) = exterior.take() {
                polys.push(Polygon::new(ext, std::mem::take(&mut holes)));
            }
            exterior = Some(LineString(coords));
        } else {
            holes.push(LineString(coords));
        }
    }
    if let Some(ext) = exterior {
        polys.push(Polygon::new(ext, holes));
    }

    MultiPolygon(polys)
}
