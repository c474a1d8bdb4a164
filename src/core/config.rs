//! Pipeline configuration from YAML

use crate::core::Job;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Per-job time limit when the file does not set one
pub const DEFAULT_TIMEOUT_SECS: u64 = 1800;

/// File name prefix for the daily log
pub const DEFAULT_LOG_PREFIX: &str = "pipeline";

/// Top-level pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name
    pub name: String,

    /// Free-form text shown by `validate` and `list`
    #[serde(default)]
    pub description: Option<String>,

    /// Wall-clock limit applied to every job (in seconds)
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Directory holding the daily log files
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Log file name prefix (`<prefix>-YYYY-MM-DD.log`)
    #[serde(default)]
    pub log_prefix: Option<String>,

    /// Jobs, in execution order
    #[serde(default)]
    pub jobs: Vec<JobConfig>,
}

/// Job configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Job name used in the log
    pub name: String,

    /// Path or command name of the executable
    pub executable: String,

    /// Arguments passed verbatim
    #[serde(default)]
    pub args: Vec<String>,

    /// Disabled jobs are skipped without affecting the order of the others
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl JobConfig {
    pub fn to_job(&self) -> Job {
        Job::new(&self.name, &self.executable).args(self.args.iter().cloned())
    }
}

impl PipelineConfig {
    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse pipeline configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Pipeline name must not be empty");
        }

        if self.timeout_secs == Some(0) {
            anyhow::bail!("timeout_secs must be greater than zero");
        }

        if let Some(prefix) = &self.log_prefix {
            if prefix.trim().is_empty() || prefix.contains(|c: char| c == '/' || c == '\\') {
                anyhow::bail!("log_prefix '{}' must be a non-empty file name", prefix);
            }
        }

        // Names identify jobs in the log, so they must be unique
        let mut seen = HashSet::new();
        for (index, job) in self.jobs.iter().enumerate() {
            if job.name.trim().is_empty() {
                anyhow::bail!("Job #{} has an empty name", index + 1);
            }
            if job.executable.trim().is_empty() {
                anyhow::bail!("Job '{}' has an empty executable", job.name);
            }
            if !seen.insert(job.name.as_str()) {
                anyhow::bail!("Duplicate job name: {}", job.name);
            }
        }

        Ok(())
    }

    /// Enabled jobs in declared order
    pub fn enabled_jobs(&self) -> Vec<Job> {
        self.jobs
            .iter()
            .filter(|job| job.enabled)
            .map(JobConfig::to_job)
            .collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Configured log directory, or `<local data dir>/jobchain/logs`
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(default_log_dir)
    }

    pub fn log_prefix(&self) -> &str {
        self.log_prefix.as_deref().unwrap_or(DEFAULT_LOG_PREFIX)
    }
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("jobchain").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}
