mod cli;

use anyhow::{Context, Result};
use chrono::Local;
use cli::commands::{ListCommand, RunCommand, ValidateCommand};
use cli::output::*;
use cli::{Cli, Command};
use jobchain::{Orchestrator, PipelineConfig, ProcessRunner, RunLogger};
use std::io::IsTerminal;
use std::time::Duration;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; stderr keeps stdout for job output and the run log
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    let exit_code = match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd).await?,
        Command::Validate(cmd) => validate_pipeline(cmd)?,
        Command::List(cmd) => list_jobs(cmd)?,
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run_pipeline(cmd: &RunCommand) -> Result<i32> {
    let config = PipelineConfig::from_file(&cmd.file)
        .context("Failed to load pipeline config")?;

    let timeout = cmd
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.timeout());
    let log_dir = cmd.log_dir.clone().unwrap_or_else(|| config.log_dir());

    let logger = RunLogger::for_run(&log_dir, config.log_prefix(), Local::now().date_naive())
        .context("Failed to open run log")?;

    let runner = ProcessRunner::new().with_passthrough(!cmd.no_passthrough);
    let orchestrator = Orchestrator::new(runner, &logger)
        .with_name(config.name.as_str())
        .with_timeout(timeout);

    let result = orchestrator
        .run_all(config.enabled_jobs())
        .await
        .context("Run log could not be written; run abandoned")?;

    println!();
    println!("{}", format_result(&config.name, &result));
    if let Some(path) = &result.log_path {
        println!("{} Log: {}", INFO, style(path.display()).dim());
    }

    if !result.is_success() {
        error!(pipeline = %config.name, completed = result.completed_count, "pipeline failed");
    }

    Ok(result.exit_code())
}

fn validate_pipeline(cmd: &ValidateCommand) -> Result<i32> {
    println!("{} Validating pipeline...", INFO);

    match PipelineConfig::from_file(&cmd.file) {
        Ok(config) => {
            let enabled = config.jobs.iter().filter(|job| job.enabled).count();
            println!("{} Pipeline configuration is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            if let Some(description) = &config.description {
                println!("  Description: {}", description);
            }
            println!(
                "  Jobs: {} ({} enabled)",
                style(config.jobs.len()).cyan(),
                style(enabled).cyan()
            );
            println!("  Timeout: {}", style(format_duration(config.timeout())).cyan());
            println!("  Log dir: {}", style(config.log_dir().display()).dim());

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(0)
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            Ok(1)
        }
    }
}

fn list_jobs(cmd: &ListCommand) -> Result<i32> {
    let config = PipelineConfig::from_file(&cmd.file)
        .context("Failed to load pipeline config")?;

    if config.jobs.is_empty() {
        println!("{} {} has no jobs", INFO, style(&config.name).bold());
        return Ok(0);
    }

    println!("{}", format_list_heading(&config));
    for (index, job) in config.jobs.iter().enumerate() {
        println!("{}", format_job_entry(index + 1, job));
    }

    Ok(0)
}
