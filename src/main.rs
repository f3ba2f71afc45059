// src/main.rs

use clap::Parser;
use pkgen::cli::Cli;
use std::process::ExitCode;
use tracing::debug;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Log to stderr so stdout stays free for recipe progress
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level())),
        )
        .init();

    let result = cli.into_config().and_then(|config| pkgen::run(&config));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(class = ?e.class(), "Run failed");
            eprintln!("pkgen: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
