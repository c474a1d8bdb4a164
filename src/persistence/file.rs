//! Append-only daily log file

use crate::persistence::{LogError, LogSink};
use chrono::NaiveDate;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Path of the log file for a given calendar day
pub fn log_file_path(dir: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}-{}.log", prefix, date.format("%Y-%m-%d")))
}

/// Log file opened in append mode; every line is synced before returning
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    /// Open (or create) the file, creating its parent directory if needed.
    /// Existing content is never truncated.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LogError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| LogError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LogError::Open {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), "opened run log");

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }
}

impl LogSink for FileSink {
    fn append(&self, line: &str) -> Result<(), LogError> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(file, "{}", line)
            .and_then(|_| file.sync_data())
            .map_err(|source| LogError::Write {
                path: self.path.clone(),
                source,
            })
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
