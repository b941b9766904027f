// Saltvault — Application Entry Point
//
// Parses CLI arguments, initializes structured logging (stderr, never
// including password material), and dispatches to the command handler.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use saltvault::cli::{execute, Cli};

fn main() -> ExitCode {
    // RUST_LOG=saltvault=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("saltvault=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match execute(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
