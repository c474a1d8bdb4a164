//! Job domain model

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Maximum number of stderr lines carried into a failure detail
const STDERR_EXCERPT_LINES: usize = 5;

/// One external task: an executable invoked with an ordered list of arguments
///
/// Arguments are passed as-is, never re-split or shell-interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    name: String,
    executable: String,
    args: Vec<String>,
}

impl Job {
    /// Create a job with no arguments
    pub fn new(name: impl Into<String>, executable: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            executable: executable.into(),
            args: Vec::new(),
        }
    }

    /// Append a single argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments, keeping their order
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Render the invocation for display. Arguments containing whitespace
    /// (or empty ones) are quoted.
    pub fn command_line(&self) -> String {
        std::iter::once(self.executable.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|part| {
                if part.is_empty() || part.chars().any(char::is_whitespace) {
                    format!("{:?}", part)
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Terminal classification of one job execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Process exited with code 0
    Success,
    /// Process exited with a nonzero code (-1 when killed by a signal)
    NonZeroExit(i32),
    /// Process outlived its time limit and was killed
    Timeout(Duration),
    /// Process could not be started at all
    SpawnFailure(String),
}

/// Result of running one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub status: JobStatus,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl JobOutcome {
    /// Outcome with no captured output
    pub fn new(status: JobStatus, duration: Duration) -> Self {
        Self {
            status,
            stdout: String::new(),
            stderr: String::new(),
            duration,
        }
    }

    pub fn with_output(mut self, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self.stderr = stderr.into();
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, JobStatus::Success)
    }

    /// Single-line description of how the job ended
    pub fn detail(&self) -> String {
        match &self.status {
            JobStatus::Success => "exited with code 0".to_string(),
            JobStatus::NonZeroExit(code) => match self.stderr_excerpt() {
                Some(excerpt) => format!("exited with code {}: {}", code, excerpt),
                None => format!("exited with code {}", code),
            },
            JobStatus::Timeout(limit) => format!("timed out after {}s", limit.as_secs_f64()),
            JobStatus::SpawnFailure(reason) => format!("failed to start: {}", reason),
        }
    }

    /// Last few non-empty stderr lines joined with " | "
    fn stderr_excerpt(&self) -> Option<String> {
        let lines: Vec<&str> = self
            .stderr
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.is_empty() {
            return None;
        }

        let start = lines.len().saturating_sub(STDERR_EXCERPT_LINES);
        Some(lines[start..].join(" | "))
    }
}
