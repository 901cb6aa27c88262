//! kdoc CLI - reStructuredText documentation builder with kernel-doc support.
//!
//! Provides commands for:
//! - `build`: Render every document of the source tree
//! - `command`: Show the kernel-doc command lines a document would run

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, CommandArgs};
use output::Output;

/// kdoc - Documentation builder.
#[derive(Parser)]
#[command(name = "kdoc", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build documents into HTML or JSON.
    Build(BuildArgs),
    /// Print the kernel-doc command line of every directive in a document.
    Command(CommandArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let verbose = matches!(&cli.command, Commands::Build(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Command(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
