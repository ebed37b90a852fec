//! # ocflv CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ocflv_cli::inspect::{run_inspect, InspectArgs};
use ocflv_cli::key::{run_key, KeyArgs};
use ocflv_cli::store::StoreArgs;
use ocflv_cli::verify::{run_verify, VerifyArgs};

/// OCFL inventory verification against an S3-compatible object store.
#[derive(Parser, Debug)]
#[command(name = "ocflv", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify an object against a JSON map of path to expected digest.
    Verify(VerifyArgs),

    /// Print the storage key of an inventory or of a path inside an object.
    Key(KeyArgs),

    /// Summarize an inventory and resolve paths through its history.
    Inspect(InspectArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Key(args) => run_key(args),
        Commands::Verify(args) => match cli.store.connect() {
            Ok(store) => run_verify(args, store).await,
            Err(e) => Err(e),
        },
        Commands::Inspect(args) => match cli.store.connect() {
            Ok(store) => run_inspect(args, store).await,
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
