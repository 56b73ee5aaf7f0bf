//! Binary crate for the `dashboard` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - The interactive menu loop
//! - Human-friendly output formatting

use clap::Parser;

mod cli;
mod menu;
mod progress;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; credentials may come from the config
    // file or the real environment instead.
    let _ = dotenvy::dotenv();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
