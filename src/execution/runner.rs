//! Subprocess runner - executes one job to a terminal outcome

use crate::core::config::DEFAULT_TIMEOUT_SECS;
use crate::core::{Job, JobOutcome, JobStatus};
use crate::persistence::{LogError, RunLogger};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, warn};

/// Time limit used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

/// How long output readers may keep draining after the process is gone.
/// Bounded so an orphaned grandchild holding a pipe cannot stall the run.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

const CHUNK_SIZE: usize = 8 * 1024;

/// Trait for job execution - allows for different implementations
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// Run `job` once, bounded by `limit`.
    ///
    /// Job-level failures are reported through the returned outcome; only a
    /// run log failure is an error.
    async fn run(&self, job: &Job, limit: Duration, log: &RunLogger) -> Result<JobOutcome, LogError>;
}

/// Runs jobs as child processes of the orchestrator
///
/// Children inherit the working directory and the full environment. Their
/// stdout and stderr are captured and, unless disabled, mirrored to the
/// orchestrator's own streams as each chunk arrives.
///
/// A timeout kills the direct child only. Processes it started itself keep
/// running; once they outlive the drain grace they no longer hold up the run.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    passthrough: bool,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self { passthrough: true }
    }

    /// Enable or disable live mirroring of job output
    pub fn with_passthrough(mut self, enabled: bool) -> Self {
        self.passthrough = enabled;
        self
    }
}

#[async_trait]
impl JobExecutor for ProcessRunner {
    async fn run(&self, job: &Job, limit: Duration, log: &RunLogger) -> Result<JobOutcome, LogError> {
        let started = Instant::now();

        let mut command = Command::new(job.executable());
        command
            .args(job.arguments())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                error!(job = %job.name(), executable = %job.executable(), error = %e, "failed to spawn job");
                let reason = format!("{}: {}", job.executable(), e);
                return Ok(JobOutcome::new(JobStatus::SpawnFailure(reason), started.elapsed()));
            }
        };

        let pid = child
            .id()
            .map(|pid| pid.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        debug!(job = %job.name(), pid = %pid, cmd = %job.command_line(), "spawned job process");
        log.record(format!("Job '{}' spawned (pid {})", job.name(), pid))?;

        let stdout_buf = Arc::new(Mutex::new(Vec::new()));
        let stderr_buf = Arc::new(Mutex::new(Vec::new()));
        let stdout_task = capture(
            child.stdout.take(),
            self.passthrough.then(tokio::io::stdout),
            stdout_buf.clone(),
        );
        let stderr_task = capture(
            child.stderr.take(),
            self.passthrough.then(tokio::io::stderr),
            stderr_buf.clone(),
        );

        // Dropping the timer future on exit cancels it
        let status = match timeout(limit, child.wait()).await {
            Ok(Ok(exit)) => {
                let code = exit.code().unwrap_or(-1);
                debug!(job = %job.name(), exit_code = code, success = exit.success(), "job process exited");
                if exit.success() {
                    JobStatus::Success
                } else {
                    JobStatus::NonZeroExit(code)
                }
            }
            Ok(Err(e)) => {
                error!(job = %job.name(), error = %e, "failed waiting for job process");
                JobStatus::NonZeroExit(-1)
            }
            Err(_) => {
                warn!(job = %job.name(), limit_secs = limit.as_secs_f64(), "job timed out; killing process");
                if let Err(e) = child.kill().await {
                    warn!(job = %job.name(), error = %e, "failed to kill timed out job process");
                }
                log.record(format!(
                    "Job '{}' exceeded its {}s timeout; process killed",
                    job.name(),
                    limit.as_secs_f64()
                ))?;
                JobStatus::Timeout(limit)
            }
        };

        let (stdout, stderr) = tokio::join!(
            drain(stdout_task, &stdout_buf),
            drain(stderr_task, &stderr_buf)
        );

        Ok(JobOutcome::new(status, started.elapsed()).with_output(stdout, stderr))
    }
}

/// Copy a child stream into `buffer` chunk by chunk, mirroring each chunk
fn capture<R, W>(
    reader: Option<R>,
    mirror: Option<W>,
    buffer: Arc<Mutex<Vec<u8>>>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let Some(mut reader) = reader else {
            return;
        };
        let mut mirror = mirror;
        let mut chunk = vec![0u8; CHUNK_SIZE];

        loop {
            let n = match reader.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    debug!(error = %e, "job output stream closed with error");
                    break;
                }
            };

            buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend_from_slice(&chunk[..n]);

            let mirror_failed = match mirror.as_mut() {
                Some(out) => match out.write_all(&chunk[..n]).await {
                    Ok(()) => out.flush().await.is_err(),
                    Err(_) => true,
                },
                None => false,
            };
            if mirror_failed {
                // Keep capturing even if our own stream went away
                debug!("stopping output passthrough after write failure");
                mirror = None;
            }
        }
    })
}

/// Wait briefly for a reader to finish, then take whatever it collected
async fn drain(mut task: JoinHandle<()>, buffer: &Mutex<Vec<u8>>) -> String {
    if timeout(DRAIN_GRACE, &mut task).await.is_err() {
        debug!("output stream still open after process ended; abandoning reader");
        task.abort();
    }

    let bytes = std::mem::take(&mut *buffer.lock().unwrap_or_else(PoisonError::into_inner));
    String::from_utf8_lossy(&bytes).into_owned()
}
