use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// Block-group transit access CLI (argument schema only)
#[derive(Parser, Debug)]
#[command(name = "acs-transit", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Link ACS tables with transit-stop counts per block group
    Run(RunArgs),
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// JSON config file; flags below override its values
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Folder holding the ACS CSV tables
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub acs_dir: Option<PathBuf>,

    /// Block-group polygons (.shp or .geojson)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub blocks: Option<PathBuf>,

    /// Bus stops (GeoJSON)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub bus_stops: Option<PathBuf>,

    /// Rail stops (CSV)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub rail_stops: Option<PathBuf>,

    /// Write the linked table to this CSV file ("-" is rejected)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,
}
