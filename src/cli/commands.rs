//! CLI command definitions

use clap::Args;
use std::path::PathBuf;

/// Run a job list
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to job list YAML file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Per-job timeout in seconds (overrides the file)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// Directory for the daily log file (overrides the file)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Don't mirror job output to this terminal
    #[arg(long)]
    pub no_passthrough: bool,
}

/// Validate a job list file
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to job list YAML file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// List the jobs of a job list file
#[derive(Debug, Args, Clone)]
pub struct ListCommand {
    /// Path to job list YAML file
    #[arg(short, long)]
    pub file: PathBuf,
}
