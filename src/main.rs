use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use acs_transit::cli::{Cli, Commands};
use acs_transit::commands::run;

/// Log to stderr; `RUST_LOG` wins over the `-v` count.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match &cli.command {
        Commands::Run(args) => run::run(args),
    }
}
