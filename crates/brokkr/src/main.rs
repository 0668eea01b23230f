//! Brokkr CLI - portable developer tool vendoring
//!
//! This is the main entry point for the Brokkr command-line interface.

mod cli;
mod commands;
mod output;
mod version;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI args
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.quiet);

    // Run command
    match cli.command {
        Commands::Install(args) => commands::install::run(args).await,
        Commands::List(args) => commands::list::run(args),
        Commands::Lock(cmd) => commands::lock::run(cmd),
        Commands::Version(args) => commands::version::run(args),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            // Default to warn so per-vendor status lines stay terse;
            // use -v/-vv for progress detail
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
