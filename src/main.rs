#![allow(clippy::unused_async)]

//! Backup Relay CLI
//!
//! Runs one workflow invocation, or serves invocations over HTTP

use backup_relay::cli::{Cli, Runner};
use clap::Parser;

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries the invocation result
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
