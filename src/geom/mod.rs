mod bbox;
mod buffer;
mod proj;

pub(crate) use bbox::StopPoint;
pub use buffer::HALF_MILE_M;
pub(crate) use buffer::{disk, SQ_M_PER_SQ_MI};
pub use proj::MetricCrs;
pub(crate) use proj::Reprojector;
