//! esmigrate CLI entry point

use clap::Parser;
use esmigrate::cli::{Cli, Commands};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_env("ESMIGRATE_LOG"))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(args) => esmigrate::cli::convert::run(args),
        Commands::Select(args) => esmigrate::cli::select::run(args),
    }
}
