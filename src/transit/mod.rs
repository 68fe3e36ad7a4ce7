//! Transit stops: loading rail and bus stops and counting them around block groups.

mod count;
mod stops;

pub use count::{count_stops, StopIndex};
pub use stops::{load_bus_stops, load_rail_stops, parse_lat_lon, BusSchema, RailSchema, StopRecord};
