//! Pipeline execution: the per-job process runner and the orchestrator

pub mod engine;
pub mod runner;

pub use engine::{ExecutionEvent, Orchestrator};
pub use runner::{JobExecutor, ProcessRunner, DEFAULT_TIMEOUT};
