//! Strictly Guess - Unified CLI
//!
//! Number guessing game with an LLM game master.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use strictly_guess::{AdvisoryClient, AdvisoryRequest, GameConfig, Hint, RANGE_MAX, RANGE_MIN};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play { config, offline } => run_play(config, offline).await,
        Command::Advise {
            guess,
            target,
            config,
        } => run_advise(guess, target, config).await,
    }
}

/// Run the terminal UI.
async fn run_play(config: Option<PathBuf>, offline: bool) -> Result<()> {
    // Log to a file so output does not corrupt the terminal
    let log_file = std::fs::File::create("strictly_guess.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .init();

    let client = if offline {
        info!("Offline mode requested");
        AdvisoryClient::offline()
    } else {
        GameConfig::load(config.as_deref())?.advisory_client()
    };

    strictly_guess::run_tui(client).await
}

/// Ask for a single advisory and print it.
#[instrument]
async fn run_advise(guess: u32, target: u32, config: Option<PathBuf>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    for value in [guess, target] {
        if !(RANGE_MIN..=RANGE_MAX).contains(&value) {
            anyhow::bail!("{} is outside {}..={}", value, RANGE_MIN, RANGE_MAX);
        }
    }

    let client = GameConfig::load(config.as_deref())?.advisory_client();
    let request = AdvisoryRequest::new(guess, target, vec![guess], Hint::for_guess(guess, target));
    let advisory = client.fetch(&request).await;

    println!("{} {}", advisory.emoji(), advisory.message());
    Ok(())
}
