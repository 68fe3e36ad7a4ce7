use anyhow::Result;
use polars::frame::DataFrame;
use tracing::{info, warn};

use crate::{
    acs::{link_acs, ACS_SOURCES},
    blocks::BlockGroups,
    combine::combine,
    config::PipelineConfig,
    transit::{count_stops, load_bus_stops, load_rail_stops},
};

/// End-to-end: ACS tables + block groups + stops → one row per block group.
pub fn run_pipeline(config: &PipelineConfig) -> Result<DataFrame> {
    let attributes = link_acs(&config.acs_dir, &ACS_SOURCES, config.number_format)?;

    let blocks = BlockGroups::load(&config.blocks, &config.key_field, config.buffer_radius_m)?;
    if blocks.is_empty() { warn!(path = %config.blocks.display(), "no block groups with geometry") }
    let rail = load_rail_stops(&config.rail_stops, &config.rail, blocks.crs())?;
    let bus = load_bus_stops(&config.bus_stops, &config.bus, blocks.crs())?;

    let num_stops = count_stops(blocks.buffers(), &[rail.as_slice(), bus.as_slice()]);
    info!(stops = rail.len() + bus.len(), block_groups = blocks.len(), "counted stops around block groups");

    combine(&attributes, &blocks.to_dataframe(&num_stops)?)
}
