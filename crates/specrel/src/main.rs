//! specrel CLI - spec document release tool.
//!
//! Provides commands for:
//! - `verify`: Check release preconditions
//! - `check`: Check preconditions and parse the spec
//! - `build`: Run the full release and write the artifact

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::ReleaseArgs;
use output::Output;

/// specrel - render a spec document as a release artifact.
#[derive(Parser)]
#[command(name = "specrel", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check release preconditions only.
    Verify(ReleaseArgs),
    /// Check preconditions and verify the spec parses.
    Check(ReleaseArgs),
    /// Verify, render and write the spec artifact.
    Build(ReleaseArgs),
}

impl Commands {
    fn args(&self) -> &ReleaseArgs {
        match self {
            Self::Verify(args) | Self::Check(args) | Self::Build(args) => args,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.args().verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Verify(args) => commands::verify(&args),
        Commands::Check(args) => commands::check(&args),
        Commands::Build(args) => commands::build(&args),
    };

    if let Err(err) = result {
        output.error(&err.report());
        if let Some(details) = err.details() {
            output.info(&details);
        }
        std::process::exit(1);
    }
}
