//! Jobs CLI
//!
//! Entry point for the `jobs` command-line tool.
//! Runs the HTTP service, asks one-off questions and checks configuration.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, CheckCommand, ServeCommand};
use jobs_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Jobs - youth policy and job-posting assistant
#[derive(Parser, Debug)]
#[command(name = "jobs")]
#[command(about = "Youth policy and job-posting assistant", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "JOBS_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "JOBS_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (gemini, ollama)
    #[arg(short, long, global = true, env = "JOBS_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "JOBS_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP service
    Serve(ServeCommand),

    /// Ask a single question from the terminal
    Ask(AskCommand),

    /// Validate configuration and show what would be loaded
    Check(CheckCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_with(cli.workspace, cli.config)?.with_overrides(
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(
        config.log_level.as_deref(),
        config.no_color,
        config.log_format()?,
    )?;

    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command_name = match &cli.command {
        Commands::Serve(_) => "serve",
        Commands::Ask(_) => "ask",
        Commands::Check(_) => "check",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Serve(cmd) => cmd.execute(config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Check(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!(kind = e.kind(), "Command failed: {}", e),
    }

    result
}
