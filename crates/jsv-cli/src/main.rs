//! # jsv CLI entry point
//!
//! Parses inputs, installs tracing, and runs one validation.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jsv_cli::{execute, Cli, WorkflowReporter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Workflow commands own stdout.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("jsv v{} starting", env!("CARGO_PKG_VERSION"));

    let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut reporter = WorkflowReporter::from_env();
    ExitCode::from(execute(&cli, &base_dir, &mut reporter).await)
}
