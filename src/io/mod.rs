//! IO module for format-specific reading and writing operations.
//!
//! # Format Modules
//!
//! - `csv` - CSV format for attribute tables, rail stops and the final output
//! - `shp` - Shapefile format for block-group polygons
//! - `geojson` - GeoJSON format for block-group polygons and bus stops

pub(crate) mod csv;
pub(crate) mod geojson;
pub(crate) mod shp;

use geo::MultiPolygon;

/// A keyed polygon feature as read from disk, before reprojection.
/// `geometry` is `None` for features stored without a shape.
#[derive(Debug, Clone)]
pub(crate) struct PolygonFeature {
    pub(crate) key: String,
    pub(crate) geometry: Option<MultiPolygon<f64>>,
}
