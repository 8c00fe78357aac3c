//! MyWords - command-line client
//!
//! Keeps a vocabulary list either on this device (guest mode) or in the
//! signed-in account, and talks to `mywordsd` for lookups and stories.

mod api;
mod cli;
mod commands;
mod config;

use clap::Parser;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::Cli;
use commands::App;
use config::CliConfig;

fn log_level(verbose: u8, env_level: Option<&str>) -> Level {
    match verbose {
        0 => match env_level.map(str::to_lowercase).as_deref() {
            Some("trace") => Level::TRACE,
            Some("debug") => Level::DEBUG,
            Some("info") => Level::INFO,
            Some("error") => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return ExitCode::from(1);
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(cli.verbose, config.log_level.as_deref()))
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    let app = match App::new(&config).await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return ExitCode::from(1);
        }
    };

    match app.run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {:#}", e);
            match e.downcast_ref::<mywords_core::Error>() {
                Some(core) if core.is_retryable() => {
                    eprintln!("{}", core.user_message())
                }
                _ => eprintln!("Error: {:#}", e),
            }
            ExitCode::from(2)
        }
    }
}
