//! ods CLI binary.

use std::process;

use clap::Parser;
use ods_classifier::cli::{args::*, commands::*};
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse command line arguments using clap
    let args = OdsArgs::parse();

    // Map verbosity to a default filter; RUST_LOG takes precedence
    let default_level = match args.verbosity() {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Execute the command
    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
