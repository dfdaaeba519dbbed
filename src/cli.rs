//! Command-line interface for strictly_guess.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Guess - number guessing with an LLM game master
#[derive(Parser, Debug)]
#[command(name = "strictly_guess")]
#[command(about = "Guess the secret number between 1 and 100", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal UI
    Play {
        /// Path to a TOML config file (provider, model, timeout)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Never call the advisory service; use fixed hints only
        #[arg(long)]
        offline: bool,
    },

    /// Ask the game master about one guess and print the reply
    Advise {
        /// The guessed number
        #[arg(long)]
        guess: u32,

        /// The secret number
        #[arg(long)]
        target: u32,

        /// Path to a TOML config file (provider, model, timeout)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
