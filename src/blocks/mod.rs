//! Block-group polygons in a metric CRS, with their areas and transit buffers.

mod load;

pub use load::BlockGroups;
