use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;
mod commands;
mod config;

use cli::{Cli, Commands};
use config::{Config, LogLevel};

fn setup_logging(log_level: &LogLevel) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agentstory")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("agentstory.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG env var takes precedence, otherwise use config log_level
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(log_level.level_filter());
    }

    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    info!(
        "Log level: {} (from {})",
        log_level.as_filter(),
        if std::env::var("RUST_LOG").is_ok() { "RUST_LOG env" } else { "config" }
    );
    Ok(())
}

fn run(cli: Cli, config: Config) -> Result<()> {
    let quiet = cli.quiet;
    match cli.command {
        Commands::Export(args) => commands::export::run(args, quiet, &config),
        Commands::Harness { action } => commands::harness::run(action, quiet, &config),
        Commands::Skill { action } => commands::skill::run(action, &config),
        Commands::Validate { spec, format } => commands::validate::run(&spec, cli::OutputFormat::resolve(format)),
        Commands::Config { action } => commands::config::run(action, &config),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration (before logging, so log messages in Config::load are silent)
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if cli.verbose && std::env::var("RUST_LOG").is_err() {
        config.log_level = LogLevel::Debug;
    }

    setup_logging(&config.log_level).context("Failed to setup logging")?;

    info!("Starting agentstory with config from: {:?}", cli.config);

    run(cli, config).context("Command failed")?;

    Ok(())
}
