//! Flowline CLI - convert WAV files between sample formats, channel layouts
//! and sample rates.

mod commands;
mod config;
mod error;
mod wav;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flowline")]
#[command(author, version, about = "Flowline audio conversion CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a WAV file to another format, channel count or sample rate
    Convert(commands::convert::ConvertArgs),

    /// Show WAV metadata and the resampler a conversion would use
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(args) => commands::convert::run(args),
        Commands::Info(args) => commands::info::run(args),
    }
}
