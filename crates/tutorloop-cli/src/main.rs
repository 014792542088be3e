//! Tutorloop CLI
//!
//! Step-by-step math answers that get better with every review.

use anyhow::Result;
use clap::Parser;
use tutorloop_core::error::exit_codes;
use tutorloop_core::{Config, TutorLoopError};

mod app;
mod commands;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for answers and JSON-RPC
    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_from(&config_path)?;

    // TUTORLOOP_DB wins over the config file
    if let Ok(db) = std::env::var("TUTORLOOP_DB") {
        config.knowledge.db_path = Some(db.into());
    }

    match cli.command {
        Commands::Ask(args) => commands::ask::run(args, &config, cli.format, cli.verbose).await,
        Commands::Kb(args) => commands::kb::run(args, &config, cli.format).await,
        Commands::Config(args) => commands::config::run(args, &config, &config_path, cli.format),
        Commands::Mcp => tutorloop_mcp::start_server(&config).await,
    }
}

fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<TutorLoopError>()
        .map(TutorLoopError::exit_code)
        .unwrap_or(exit_codes::GENERAL_ERROR)
}
