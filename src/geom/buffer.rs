use std::f64::consts::TAU;

use geo::{Coord, LineString, Point, Polygon};

/// Half a statute mile, in meters.
pub const HALF_MILE_M: f64 = 804.672;

/// Square meters in one square statute mile.
pub(crate) const SQ_M_PER_SQ_MI: f64 = 2_589_988.110336;

/// Segments used to approximate a circle (16 per quadrant).
const DISK_SEGMENTS: usize = 64;

/// Polygonal approximation of a disk of `radius` around `center`.
/// Vertices lie on the circle, so the polygon is inscribed in the true disk.
pub(crate) fn disk(center: Point<f64>, radius: f64) -> Polygon<f64> {
    let mut ring: Vec<Coord<f64>> = (0..DISK_SEGMENTS)
        .map(|i| {
            let theta = TAU * i as f64 / DISK_SEGMENTS as f64;
            Coord { x: center.x() + radius * theta.cos(), y: center.y() + radius * theta.sin() }
        })
        .collect();
    ring.push(ring[0]);
    Polygon::new(LineString(ring), vec![])
}
