use std::path::Path;

use anyhow::{bail, Result};
use tracing::info;

use crate::{
    cli::RunArgs,
    common::require_writable,
    config::PipelineConfig,
    io::csv::write_csv,
    pipeline::run_pipeline,
};

/// Resolve the run configuration: config file (or defaults), then flag overrides.
pub fn resolve_config(args: &RunArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &args.acs_dir { config.acs_dir = dir.clone() }
    if let Some(path) = &args.blocks { config.blocks = path.clone() }
    if let Some(path) = &args.bus_stops { config.bus_stops = path.clone() }
    if let Some(path) = &args.rail_stops { config.rail_stops = path.clone() }
    Ok(config)
}

pub fn run(args: &RunArgs) -> Result<()> {
    // Assert output path is not stdout
    if let Some(output) = &args.output {
        if output == Path::new("-") { bail!("stdout is not supported."); }
        require_writable(output, args.force)?;
    }

    let config = resolve_config(args)?;
    info!(
        acs = %config.acs_dir.display(),
        blocks = %config.blocks.display(),
        bus = %config.bus_stops.display(),
        rail = %config.rail_stops.display(),
        "[run] starting pipeline"
    );

    let mut table = run_pipeline(&config)?;

    match &args.output {
        Some(output) => {
            write_csv(&mut table, output)?;
            println!("Wrote {} block groups to {}", table.height(), output.display());
        }
        None => println!("Linked {} block groups ({} columns)", table.height(), table.width()),
    }
    Ok(())
}
