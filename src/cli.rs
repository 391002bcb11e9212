use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fertiplan",
    version,
    about = "Soil-fertility decision engine: liming schedules and fertilization plans"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a fertiplan YAML config
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Multi-year liming schedule for a parcel document
    Lime {
        /// Parcel document (JSON or YAML)
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Fertilization plan for a parcel document
    Plan {
        /// Parcel document (JSON or YAML)
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Detect the data tier of a parcel document
    Tier {
        /// Parcel document (JSON or YAML)
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Print the effective configuration
    Config,
    /// Interactively write a config file
    Init {
        /// Where to write it (defaults to the user config directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
    Csv,
}
