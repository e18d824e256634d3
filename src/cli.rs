use std::path::PathBuf;

use clap::{Parser, Subcommand};
use metprep_dataset::DatasetKind;

/// Builds simulation-driver input datasets from station observation exports.
#[derive(Parser)]
#[command(
    name = "metprep",
    version,
    about = "Assemble forcing, domain and state datasets from observation CSV exports"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Build forcing, domain and state datasets plus the driver configuration.
    Assemble(AssembleArgs),
    /// Summarise a persisted dataset.
    Inspect(InspectArgs),
}

/// Arguments for the `assemble` subcommand.
#[derive(clap::Args)]
pub struct AssembleArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "metprep.toml")]
    pub config: PathBuf,

    /// Override the output directory from config.
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Skip writing the driver configuration record.
    #[arg(long)]
    pub no_driver_config: bool,
}

/// Arguments for the `inspect` subcommand.
#[derive(clap::Args)]
pub struct InspectArgs {
    /// NetCDF file to read.
    pub file: PathBuf,

    /// Dataset kind; read from the file's `dataset` attribute when omitted.
    #[arg(short, long)]
    pub kind: Option<DatasetKind>,
}
