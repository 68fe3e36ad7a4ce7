use anyhow::{anyhow, Context, Result};
use geo::{Coord, MapCoords, Rect};
use proj4rs::{proj::Proj as Proj4, transform::transform};

/// Build PROJ.4 string for a source geographic CRS (degrees → radians handled in code).
#[inline]
fn source_geog_proj4(epsg: u32) -> &'static str {
    match epsg {
        4269 | 4937 => "+proj=longlat +datum=NAD83 +no_defs +type=crs",
        _            => "+proj=longlat +datum=WGS84 +no_defs +type=crs",
    }
}

/// Target metric CRS shared by every layer of a pipeline run (a UTM zone).
#[derive(Debug, Clone, PartialEq)]
pub struct MetricCrs {
    proj_string: String,
}

impl MetricCrs {
    /// Choose the UTM zone containing the center of `bounds` (lon/lat degrees).
    /// - WGS84: 326zz (north) / 327zz (south)
    /// - NAD83: 269zz (north only; if south, fall back to WGS84 UTM-S)
    pub fn utm_for(bounds: Option<Rect<f64>>, source_epsg: u32) -> Self {
        let center = if let Some(b) = bounds { b.center() }
        else { Coord { x: -104.0, y: 45.0 } }; // US geographic center (fallback)

        let zone = (((center.x + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u32;
        let north = center.y >= 0.0;
        let is_nad83 = matches!(source_epsg, 4269 | 4937);

        // NAD83 UTM only standard in north, fall back to WGS84 in south.
        let datum = if is_nad83 && north { "NAD83" } else { "WGS84" };
        let south = if north { "" } else { " +south" };

        Self { proj_string: format!("+proj=utm +zone={zone}{south} +datum={datum} +units=m +no_defs +type=crs") }
    }

    #[inline] pub fn proj_string(&self) -> &str { &self.proj_string }

    /// Build a reprojector from the given geographic source CRS into this metric CRS.
    pub(crate) fn reprojector(&self, source_epsg: u32) -> Result<Reprojector> {
        let from = {
            let proj_string = source_geog_proj4(source_epsg);
            Proj4::from_proj_string(proj_string)
                .map_err(|e| anyhow!("{e:?}"))
                .with_context(|| format!("failed to build source PROJ.4: {proj_string}"))?
        };

        let to = Proj4::from_proj_string(&self.proj_string)
            .map_err(|e| anyhow!("{e:?}"))
            .with_context(|| format!("failed to build target PROJ.4: {}", self.proj_string))?;

        Ok(Reprojector { from, to })
    }
}

/// Transforms lon/lat geometries into meters.
pub(crate) struct Reprojector {
    from: Proj4,
    to: Proj4,
}

impl Reprojector {
    /// Reproject a single lon/lat coordinate (degrees) to meters.
    pub(crate) fn coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
        transform(&self.from, &self.to, &mut point)
            .map_err(|e| anyhow!("CRS transform failed at ({}, {}): {e:?}", coord.x, coord.y))?;
        Ok(Coord { x: point.0, y: point.1 })
    }

    /// Reproject any geometry from lon/lat to the metric CRS.
    pub(crate) fn geometry<G: MapCoords<f64, f64>>(&self, geom: &G) -> Result<G::Output> {
        geom.try_map_coords(|coord| self.coord(coord))
    }
}
