use geo::{BoundingRect, Intersects, Polygon};
use rstar::{RTree, AABB};

use crate::geom::StopPoint;
use super::StopRecord;

/// R-tree over the concatenation of several stop tables.
#[derive(Debug)]
pub struct StopIndex {
    tree: RTree<StopPoint>,
}

impl StopIndex {
    /// Index every stop of every table. Rows keep their position in the concatenation.
    pub fn new(tables: &[&[StopRecord]]) -> Self {
        Self {
            tree: RTree::bulk_load(
                tables.iter()
                    .flat_map(|table| table.iter())
                    .enumerate()
                    .map(|(i, stop)| StopPoint::new(i, stop.location))
                    .collect()
            ),
        }
    }

    #[inline] pub fn len(&self) -> usize { self.tree.size() }

    #[inline] pub fn is_empty(&self) -> bool { self.tree.size() == 0 }

    /// Positions of the stops intersecting `buffer` (boundary inclusive), in ascending order.
    pub fn stops_within(&self, buffer: &Polygon<f64>) -> Vec<usize> {
        let Some(rect) = buffer.bounding_rect() else { return vec![] };
        let envelope = AABB::from_corners(rect.min().into(), rect.max().into());

        let mut hits = self.tree.locate_in_envelope_intersecting(&envelope)
            .filter(|stop| buffer.intersects(stop.point()))
            .map(StopPoint::idx)
            .collect::<Vec<_>>();
        hits.sort_unstable();
        hits
    }
}

/// Number of stops (across all tables) inside each buffer.
pub fn count_stops(buffers: &[Polygon<f64>], tables: &[&[StopRecord]]) -> Vec<u32> {
    let index = StopIndex::new(tables);
    buffers.iter()
        .map(|buffer| index.stops_within(buffer).len() as u32)
        .collect()
}
