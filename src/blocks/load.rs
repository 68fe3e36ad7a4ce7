use std::{collections::HashSet, path::Path};

use anyhow::{bail, ensure, Context, Result};
use geo::{Area, BoundingRect, Centroid, Coord, MultiPolygon, Polygon, Rect};
use polars::{frame::DataFrame, prelude::Column};
use tracing::{info, warn};

use crate::{
    acs::KEY,
    common::{extension, require_file_exists},
    geom::{disk, MetricCrs, SQ_M_PER_SQ_MI},
    io::{geojson::read_polygons_geojson, shp::{epsg_from_prj, read_polygons_shp}, PolygonFeature},
};

/// Shapefiles without a `.prj` are assumed to be NAD83 lon/lat, as TIGER/Line files are.
const DEFAULT_SHP_EPSG: u32 = 4269;

/// GeoJSON is lon/lat on WGS84.
const GEOJSON_EPSG: u32 = 4326;

/// Block groups reprojected to a metric CRS. All vectors are indexed alike.
#[derive(Debug, Clone)]
pub struct BlockGroups {
    geo_ids: Vec<i64>,
    shapes: Vec<MultiPolygon<f64>>, // boundaries, in meters
    buffers: Vec<Polygon<f64>>, // disks around each centroid
    crs: MetricCrs,
}

impl BlockGroups {
    /// Load block groups from a `.shp` or `.geojson` file, keyed by `key_field`,
    /// with buffers of `radius_m` meters around each centroid.
    pub fn load(path: &Path, key_field: &str, radius_m: f64) -> Result<Self> {
        require_file_exists(path)?;

        let (features, epsg) = match extension(path).as_deref() {
            Some("shp") => (
                read_polygons_shp(path, key_field)?,
                epsg_from_prj(path)?.unwrap_or(DEFAULT_SHP_EPSG),
            ),
            Some("geojson" | "json") => (read_polygons_geojson(path, key_field)?, GEOJSON_EPSG),
            _ => bail!("[blocks::load] Unsupported block-group file (expected .shp or .geojson): {}", path.display()),
        };

        Self::from_features(features, epsg, radius_m)
            .with_context(|| format!("[blocks::load] Failed to build block groups from {}", path.display()))
    }

    /// Build block groups from lon/lat features in the given EPSG, dropping features without geometry.
    pub(crate) fn from_features(features: Vec<PolygonFeature>, epsg: u32, radius_m: f64) -> Result<Self> {
        ensure!(radius_m > 0.0, "buffer radius must be positive, got {radius_m}");

        let total = features.len();
        let (geo_ids, lonlat): (Vec<i64>, Vec<MultiPolygon<f64>>) = features.into_iter()
            .filter_map(|feature| match feature.geometry {
                Some(shape) if !shape.0.is_empty() => Some((feature.key, shape)),
                _ => None,
            })
            .map(|(key, shape)| -> Result<(i64, MultiPolygon<f64>)> {
                let id = key.parse().with_context(|| format!("key {key:?} is not an integer"))?;
                Ok((id, shape))
            })
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .unzip();

        if geo_ids.len() < total {
            warn!(dropped = total - geo_ids.len(), "block groups without geometry were dropped");
        }

        let mut seen = HashSet::with_capacity(geo_ids.len());
        if let Some(dup) = geo_ids.iter().find(|&&id| !seen.insert(id)) {
            bail!("duplicate block group key {dup}");
        }

        let crs = MetricCrs::utm_for(bounds(&lonlat), epsg);
        let reproject = crs.reprojector(epsg)?;
        let shapes = lonlat.iter()
            .map(|shape| reproject.geometry(shape))
            .collect::<Result<Vec<_>>>()?;

        let buffers = geo_ids.iter().zip(&shapes)
            .map(|(id, shape)| shape.centroid()
                .map(|center| disk(center, radius_m))
                .with_context(|| format!("block group {id} has no centroid")))
            .collect::<Result<Vec<_>>>()?;

        info!(block_groups = geo_ids.len(), crs = crs.proj_string(), "loaded block groups");
        Ok(Self { geo_ids, shapes, buffers, crs })
    }

    /// Get the number of block groups.
    #[inline] pub fn len(&self) -> usize { self.geo_ids.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.geo_ids.is_empty() }

    #[inline] pub fn geo_ids(&self) -> &[i64] { &self.geo_ids }

    /// Areas of the projected boundaries, in square miles.
    pub fn areas(&self) -> Vec<f64> {
        self.shapes.iter()
            .map(|shape| shape.unsigned_area() / SQ_M_PER_SQ_MI)
            .collect()
    }

    /// Buffers around each centroid, used for stop counting only.
    #[inline] pub fn buffers(&self) -> &[Polygon<f64>] { &self.buffers }

    /// The metric CRS every other layer must be projected into.
    #[inline] pub fn crs(&self) -> &MetricCrs { &self.crs }

    /// Table of `GEOID`, `area` and the given per-block-group stop counts.
    pub fn to_dataframe(&self, num_stops: &[u32]) -> Result<DataFrame> {
        ensure!(num_stops.len() == self.len(),
            "[blocks] got {} stop counts for {} block groups", num_stops.len(), self.len());

        Ok(DataFrame::new(vec![
            Column::new(KEY.into(), self.geo_ids.clone()),
            Column::new("area".into(), self.areas()),
            Column::new("num_stops".into(), num_stops.to_vec()),
        ])?)
    }
}

/// Compute the bounding rectangle of all shapes.
fn bounds(shapes: &[MultiPolygon<f64>]) -> Option<Rect<f64>> {
    shapes.iter()
        .filter_map(|shape| shape.bounding_rect())
        .reduce(|a, b| Rect::new(
            Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
            Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
        ))
}
