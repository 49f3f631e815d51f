mod cli;
mod context;
mod handlers;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use context::CliContext;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("TRACKER_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(EnvFilter::try_from_env("TRACKER_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let cli = Cli::parse();
    let file = cli.file;

    match cli.command {
        Commands::Init(args) => handlers::init::handle(&file, args).await?,
        Commands::Board(args) => handlers::board::handle(&load(&file).await, args).await?,
        Commands::Move(args) => handlers::issue::handle_move(&mut load(&file).await, args).await?,
        Commands::Backlog(args) => {
            handlers::issue::handle_backlog(&mut load(&file).await, args).await?
        }
        Commands::Sync(args) => handlers::sync::handle(&mut load(&file).await, args).await?,
    }

    Ok(())
}

async fn load(file_path: &str) -> CliContext {
    match CliContext::load(file_path).await {
        Ok(ctx) => ctx,
        Err(e) => output::output_tracker_error(&e),
    }
}
