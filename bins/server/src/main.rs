mod cmd;
mod config;
mod error;

use std::process::ExitCode;

use clap::Parser;
use config::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let result = match Cli::parse().command {
        Commands::Serve(args) => cmd::serve::run(args).await,
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "dbapi-server failed");
            ExitCode::FAILURE
        }
    }
}
