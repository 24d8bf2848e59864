// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transport Match command-line client.

use clap::Parser;
use std::process::ExitCode;
use transport_match::{
    cli::{self, Cli},
    config::{Config, LogFormat},
    ClientError,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    init_logging(config.log_format, cli.verbose);

    let mut stdout = std::io::stdout().lock();
    match cli::run(cli, config, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            if err
                .downcast_ref::<ClientError>()
                .is_some_and(ClientError::requires_login)
            {
                eprintln!("Log in again with: transport-match login --email <EMAIL>");
            }
            ExitCode::FAILURE
        }
    }
}

/// Log filter used when `RUST_LOG` is unset.
fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "transport_match=info",
        1 => "transport_match=debug",
        _ => "transport_match=trace",
    }
}

/// Initialize logging to stderr, plain or JSON.
fn init_logging(format: LogFormat, verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true),
            )
            .init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init(),
    }
}
