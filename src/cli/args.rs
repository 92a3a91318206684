use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::processors::AlignmentPolicy;

#[derive(Parser)]
#[command(name = "irradiance-processor")]
#[command(about = "Daily, monthly and yearly solar-irradiance series for districts and provinces")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch hourly archives and write per-district series
    Fetch {
        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Average district series into province series
    Aggregate {
        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Fetch, then aggregate
    Run {
        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Display statistics for a written series file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,
    },
}

/// Overrides applied on top of the loaded configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    #[arg(short, long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Root directory of the output hierarchy")]
    pub data_root: Option<PathBuf>,

    #[arg(short, long, help = "Only process this province")]
    pub parent: Option<String>,

    #[arg(long, help = "Reprocess districts and provinces that are already complete")]
    pub force: bool,

    #[arg(long)]
    pub max_workers: Option<usize>,

    #[arg(long, value_enum)]
    pub alignment: Option<AlignmentPolicy>,
}
