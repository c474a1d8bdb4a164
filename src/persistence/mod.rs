//! Run log: timestamped entries written to a live sink and a durable sink
//!
//! Every entry is written to both sinks before `record` returns. A durable
//! write that fails aborts the run; a live write that fails is only reported.

pub mod file;

pub use file::{log_file_path, FileSink};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::warn;

/// Error types for run log operations
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to create log directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open log file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write log file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write to {sink}: {source}")]
    Stream {
        sink: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// One line of the run log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl LogEntry {
    /// Stamp a message with the current time
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
        }
    }

    /// `[2024-05-01T02:00:00.000Z] message`
    pub fn to_line(&self) -> String {
        format!(
            "[{}] {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.message
        )
    }
}

/// Destination for rendered log lines
pub trait LogSink: Send + Sync {
    /// Write one line. Must not return before the line is written.
    fn append(&self, line: &str) -> Result<(), LogError>;

    /// Filesystem location of the sink, if it has one
    fn location(&self) -> Option<&Path> {
        None
    }
}

/// Writes lines to the process's standard output
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn append(&self, line: &str) -> Result<(), LogError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", line)
            .and_then(|_| stdout.flush())
            .map_err(|source| LogError::Stream { sink: "stdout", source })
    }
}

/// In-memory sink, shared between clones
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every line written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Lines with their `[timestamp] ` prefix removed
    pub fn messages(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .map(|line| match line.split_once("] ") {
                Some((_, message)) => message.to_string(),
                None => line,
            })
            .collect()
    }
}

impl LogSink for MemorySink {
    fn append(&self, line: &str) -> Result<(), LogError> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
        Ok(())
    }
}

/// Run log shared by the orchestrator and the job runner
pub struct RunLogger {
    live: Option<Box<dyn LogSink>>,
    durable: Box<dyn LogSink>,
}

impl RunLogger {
    pub fn new(live: impl LogSink + 'static, durable: impl LogSink + 'static) -> Self {
        Self {
            live: Some(Box::new(live)),
            durable: Box::new(durable),
        }
    }

    /// Logger without a live mirror
    pub fn durable_only(durable: impl LogSink + 'static) -> Self {
        Self {
            live: None,
            durable: Box::new(durable),
        }
    }

    /// Console mirror plus the daily file `<dir>/<prefix>-<date>.log`
    pub fn for_run(dir: &Path, prefix: &str, date: NaiveDate) -> Result<Self, LogError> {
        let file = FileSink::open(log_file_path(dir, prefix, date))?;
        Ok(Self::new(ConsoleSink, file))
    }

    /// Record a message in both sinks
    pub fn record(&self, message: impl Into<String>) -> Result<LogEntry, LogError> {
        let entry = LogEntry::now(message);
        let line = entry.to_line();

        if let Some(live) = &self.live {
            if let Err(e) = live.append(&line) {
                warn!(error = %e, "live log sink rejected entry");
            }
        }

        self.durable.append(&line)?;
        Ok(entry)
    }

    /// Location of the durable log, when it is a file
    pub fn log_path(&self) -> Option<&Path> {
        self.durable.location()
    }
}

impl std::fmt::Debug for RunLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLogger")
            .field("live", &self.live.is_some())
            .field("log_path", &self.log_path())
            .finish()
    }
}
