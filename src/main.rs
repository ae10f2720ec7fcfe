//! Rhythmtree CLI - Polyrhythm Player
//!
//! Command-line host for the rhythmtree scheduler.

use clap::Parser;
use env_logger::Env;
use log::info;

use rhythmtree::cli::{commands, Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Rhythmtree v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(Commands::Play(args)) => commands::play(args).await,
        Some(Commands::Layers) => {
            commands::layers();
            Ok(())
        }
        None => {
            println!("Rhythmtree v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}
