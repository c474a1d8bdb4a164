//! jobchain - run an ordered list of external jobs, one at a time, and stop at the first failure

pub mod core;
pub mod execution;
pub mod persistence;

// Re-export commonly used types
pub use crate::core::{Job, JobOutcome, JobStatus, PipelineResult, PipelineRun, PipelineStatus, RunState};
pub use crate::core::config::PipelineConfig;
pub use execution::{ExecutionEvent, JobExecutor, Orchestrator, ProcessRunner};
pub use persistence::{ConsoleSink, FileSink, LogEntry, LogError, LogSink, MemorySink, RunLogger};
