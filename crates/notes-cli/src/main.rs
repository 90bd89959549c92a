// ABOUTME: Entry point for the notes CLI
// ABOUTME: Loads .env, sets up logging and dispatches the parsed command

use anyhow::Result;
use clap::Parser;
use notes_cli::commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    notes_log::init(cli.verbose);

    notes_cli::run(cli).await
}
