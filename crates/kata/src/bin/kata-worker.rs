//! Kata worker
//!
//! Reads one judging request from stdin, writes one response to stdout and
//! exits. Diagnostics go to stderr.

use std::io;
use std::process::ExitCode;

use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match kata::engine::serve(io::stdin().lock(), io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "worker failed");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
