//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// remi - dependency-ordered plugin registration
#[derive(Parser, Debug)]
#[command(name = "remi")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to remi.yaml config file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register the demo hub plugins and print what they say
    Hub(HubArgs),

    /// Show the effective engine configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct HubArgs {
    /// How many times the bar plugin repeats what foo said
    #[arg(long, default_value_t = 4)]
    pub say_times: u64,

    /// Per-plugin deadline in milliseconds (overrides config; 0 disables)
    #[arg(long, env = "REMI_HUB_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
