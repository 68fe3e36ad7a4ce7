use geo::Point;
use rstar::{RTreeObject, AABB};

/// A stop location in an R-tree, associated with its row in the concatenated stop table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StopPoint {
    idx: usize, // Index of the stop record
    point: Point<f64>,
}

impl StopPoint {
    pub(crate) fn new(idx: usize, point: Point<f64>) -> Self {
        Self { idx, point }
    }

    /// Get the index of the corresponding stop record.
    #[inline] pub(crate) fn idx(&self) -> usize { self.idx }

    /// Get the stop location.
    #[inline] pub(crate) fn point(&self) -> &Point<f64> { &self.point }
}

impl RTreeObject for StopPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.point.x(), self.point.y()])
    }
}
