//! complexscan CLI - Main entry point

use clap::Parser;
use complexscan_cli::commands::build::BuildStep;
use complexscan_cli::config::{self, Overrides};
use complexscan_cli::{Cli, CliError, Commands};
use complexscan_common::logging::{init_logging, LogConfig, LogLevel, LogOutput, LogRotation};
use complexscan_pipeline::PipelineConfig;
use std::path::Path;
use std::process;
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;

#[tokio::main]
async fn main() {
    // .env values feed COMPLEXSCAN_* and LOG_* lookups
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Handle markdown help generation
    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    let Some(command) = &cli.command else {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    };

    let config = if command.needs_config() {
        let overrides = Overrides {
            base_dir: cli.base_dir.clone(),
            threads: cli.threads,
        };
        match config::load(cli.config.as_deref(), &overrides) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            },
        }
    } else {
        None
    };

    let log_dir = config
        .as_ref()
        .map(|c| c.paths.log_dir.clone())
        .unwrap_or_else(|| "logs".into());
    let guard = init_stage_logging(command, cli.verbose, &log_dir);

    let result = execute_command(command, config.as_ref()).await;
    if let Err(e) = &result {
        error!(error = %e, "Command failed");
    }

    // Flush the stage log before exiting
    drop(guard);

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Console logging for every command, plus the stage log file for stages
fn init_stage_logging(command: &Commands, verbose: bool, log_dir: &Path) -> Option<WorkerGuard> {
    let level = if verbose { LogLevel::Debug } else { LogLevel::Info };

    let log_config = match command.log_file_name() {
        Some(file_name) => LogConfig::builder()
            .level(level)
            .output(LogOutput::Both)
            .log_dir(log_dir)
            .log_file_name(file_name)
            .rotation(LogRotation::Never)
            .build(),
        None => LogConfig::builder()
            .level(if verbose { LogLevel::Debug } else { LogLevel::Warn })
            .output(LogOutput::Console)
            .build(),
    };

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI works without logging; report and carry on
    match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        },
    }
}

/// Execute the CLI command
async fn execute_command(
    command: &Commands,
    config: Option<&PipelineConfig>,
) -> complexscan_cli::Result<()> {
    // Only `subunit` runs without a pipeline configuration
    let config = || config.ok_or_else(|| CliError::config("no pipeline configuration loaded"));

    match command {
        Commands::Aggregate => complexscan_cli::commands::aggregate::run(config()?).await,

        Commands::Cluster { force } => {
            complexscan_cli::commands::build::run(config()?, BuildStep::Cluster, *force).await
        },
        Commands::Align { force } => {
            complexscan_cli::commands::build::run(config()?, BuildStep::Align, *force).await
        },
        Commands::Profile { force } => {
            complexscan_cli::commands::build::run(config()?, BuildStep::Profile, *force).await
        },
        Commands::Build { force } => {
            complexscan_cli::commands::build::run(config()?, BuildStep::All, *force).await
        },

        Commands::Search { force_run, force } => {
            complexscan_cli::commands::search::run(config()?, *force_run, *force).await
        },

        Commands::Process => complexscan_cli::commands::process::run(config()?).await,

        Commands::Status { json } => {
            complexscan_cli::commands::status::run(config()?, *json).await
        },

        Commands::Subunit {
            symbol,
            description,
        } => complexscan_cli::commands::subunit::run(symbol, description.as_deref()).await,
    }
}
