//! Test utility functions for jobchain scenarios

use async_trait::async_trait;
use jobchain::{
    Job, JobExecutor, JobOutcome, JobStatus, LogError, LogSink, MemorySink, Orchestrator,
    PipelineResult, RunLogger,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Executor that returns a scripted status per job name and records every call
#[derive(Clone, Default)]
pub struct ScriptedExecutor {
    script: Arc<HashMap<String, JobStatus>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedExecutor {
    /// Jobs missing from the script succeed
    pub fn new(script: &[(&str, JobStatus)]) -> Self {
        Self {
            script: Arc::new(
                script
                    .iter()
                    .map(|(name, status)| (name.to_string(), status.clone()))
                    .collect(),
            ),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobExecutor for ScriptedExecutor {
    async fn run(&self, job: &Job, _limit: Duration, _log: &RunLogger) -> Result<JobOutcome, LogError> {
        self.calls.lock().unwrap().push(job.name().to_string());
        let status = self
            .script
            .get(job.name())
            .cloned()
            .unwrap_or(JobStatus::Success);
        let stderr = match status {
            JobStatus::NonZeroExit(_) => format!("{} broke\n", job.name()),
            _ => String::new(),
        };
        Ok(JobOutcome::new(status, Duration::from_millis(5)).with_output("", stderr))
    }
}

/// Durable sink that accepts `capacity` lines and then fails
pub struct FullDiskSink {
    inner: MemorySink,
    capacity: usize,
    written: AtomicUsize,
}

impl FullDiskSink {
    pub fn new(inner: MemorySink, capacity: usize) -> Self {
        Self {
            inner,
            capacity,
            written: AtomicUsize::new(0),
        }
    }
}

impl LogSink for FullDiskSink {
    fn append(&self, line: &str) -> Result<(), LogError> {
        if self.written.fetch_add(1, Ordering::SeqCst) >= self.capacity {
            return Err(LogError::Write {
                path: PathBuf::from("/full/pipeline.log"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "no space left on device"),
            });
        }
        self.inner.append(line)
    }
}

/// Everything observable about one scripted run
pub struct ScenarioResult {
    pub result: PipelineResult,
    pub calls: Vec<String>,
    pub messages: Vec<String>,
}

pub fn jobs(names: &[&str]) -> Vec<Job> {
    names
        .iter()
        .map(|name| Job::new(*name, format!("./bin/{}", name)))
        .collect()
}

/// Run `names` in order against a scripted executor with an in-memory log
pub async fn run_scripted(names: &[&str], script: &[(&str, JobStatus)]) -> ScenarioResult {
    let sink = MemorySink::new();
    let logger = RunLogger::durable_only(sink.clone());
    let executor = ScriptedExecutor::new(script);

    let result = Orchestrator::new(executor.clone(), &logger)
        .with_name("scenario")
        .run_all(jobs(names))
        .await
        .expect("in-memory log never fails");

    ScenarioResult {
        result,
        calls: executor.calls(),
        messages: sink.messages(),
    }
}

/// Log messages without the run header
pub fn job_messages(messages: &[String]) -> Vec<&str> {
    messages
        .iter()
        .filter(|m| !m.starts_with("Pipeline 'scenario' started"))
        .map(String::as_str)
        .collect()
}
