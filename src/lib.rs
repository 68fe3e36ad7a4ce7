#![doc = "Census block-group attributes linked with nearby transit-stop counts"]
mod acs;
mod blocks;
mod combine;
mod common;
mod config;
mod geom;
mod io;
mod pipeline;
mod transit;

pub mod cli;
pub mod commands;

#[doc(inline)]
pub use acs::{
    clean_commute, clean_employment, clean_hispanic, clean_income, clean_population, clean_race,
    clean_vehicles, find_per_pop, link_acs, merge_on_key, Bin, BinTable, Cleaner, ColumnSelector,
    NumberFormat, ACS_SOURCES, EMPLOYMENT_COL, KEY, PER_POP, VEHICLES_COL,
};

#[doc(inline)]
pub use blocks::BlockGroups;

#[doc(inline)]
pub use combine::combine;

#[doc(inline)]
pub use config::PipelineConfig;

#[doc(inline)]
pub use geom::{MetricCrs, HALF_MILE_M};

#[doc(inline)]
pub use pipeline::run_pipeline;

#[doc(inline)]
pub use transit::{count_stops, load_bus_stops, load_rail_stops, parse_lat_lon, BusSchema, RailSchema, StopIndex, StopRecord};
