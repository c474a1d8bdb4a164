//! Orchestrator - drives the job list one job at a time and stops at the first failure

use crate::{
    core::{Job, PipelineResult, PipelineRun, RunState},
    execution::{JobExecutor, DEFAULT_TIMEOUT},
    persistence::{LogError, RunLogger},
};
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

/// Events recorded in the run log, in the order they happen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionEvent {
    PipelineStarted {
        run_id: Uuid,
        pipeline_name: String,
        total_jobs: usize,
    },
    JobStarted {
        index: usize,
        total_jobs: usize,
        job_name: String,
    },
    JobSucceeded {
        job_name: String,
        duration: Duration,
    },
    JobFailed {
        job_name: String,
        detail: String,
    },
    PipelineStopped {
        job_name: String,
        completed: usize,
        total_jobs: usize,
    },
    PipelineSucceeded {
        completed: usize,
    },
}

impl ExecutionEvent {
    /// Text written to the run log
    pub fn message(&self) -> String {
        match self {
            ExecutionEvent::PipelineStarted {
                run_id,
                pipeline_name,
                total_jobs,
            } => format!(
                "Pipeline '{}' started with {} job(s) (run {})",
                pipeline_name,
                total_jobs,
                &run_id.to_string()[..8]
            ),
            ExecutionEvent::JobStarted {
                index,
                total_jobs,
                job_name,
            } => format!("Starting job {}/{}: {}", index + 1, total_jobs, job_name),
            ExecutionEvent::JobSucceeded { job_name, duration } => format!(
                "Job '{}' succeeded in {:.1}s",
                job_name,
                duration.as_secs_f64()
            ),
            ExecutionEvent::JobFailed { job_name, detail } => {
                format!("Job '{}' failed: {}", job_name, detail)
            }
            ExecutionEvent::PipelineStopped {
                job_name,
                completed,
                total_jobs,
            } => format!(
                "Pipeline stopped at job '{}' ({}/{} jobs completed)",
                job_name, completed, total_jobs
            ),
            ExecutionEvent::PipelineSucceeded { completed } => {
                format!("Full pipeline success: {} job(s) completed", completed)
            }
        }
    }
}

/// Sequential, fail-fast pipeline orchestrator
pub struct Orchestrator<'a, E> {
    executor: E,
    logger: &'a RunLogger,
    timeout: Duration,
    pipeline_name: String,
}

impl<'a, E: JobExecutor> Orchestrator<'a, E> {
    pub fn new(executor: E, logger: &'a RunLogger) -> Self {
        Self {
            executor,
            logger,
            timeout: DEFAULT_TIMEOUT,
            pipeline_name: "pipeline".to_string(),
        }
    }

    /// Per-job wall-clock limit
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Name shown in the run header
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.pipeline_name = name.into();
        self
    }

    fn emit(&self, event: ExecutionEvent) -> Result<(), LogError> {
        self.logger.record(event.message()).map(|_| ())
    }

    /// Run every job in order, stopping at the first one that does not succeed.
    ///
    /// Job failures end up in the returned result; an `Err` means the run log
    /// could not be written and the run was abandoned.
    pub async fn run_all(&self, jobs: Vec<Job>) -> Result<PipelineResult, LogError> {
        let mut run = PipelineRun::new(jobs);
        let total_jobs = run.jobs().len();

        info!(pipeline = %self.pipeline_name, run_id = %run.run_id(), total_jobs, "starting pipeline run");
        self.emit(ExecutionEvent::PipelineStarted {
            run_id: run.run_id(),
            pipeline_name: self.pipeline_name.clone(),
            total_jobs,
        })?;

        run.start();

        while let Some((index, job)) = run.current_job() {
            let job = job.clone();

            self.emit(ExecutionEvent::JobStarted {
                index,
                total_jobs,
                job_name: job.name().to_string(),
            })?;

            let outcome = self.executor.run(&job, self.timeout, self.logger).await?;

            if outcome.is_success() {
                self.emit(ExecutionEvent::JobSucceeded {
                    job_name: job.name().to_string(),
                    duration: outcome.duration,
                })?;
                run.record_outcome(outcome);
            } else {
                let detail = outcome.detail();
                error!(job = %job.name(), detail = %detail, "job failed; stopping pipeline");
                self.emit(ExecutionEvent::JobFailed {
                    job_name: job.name().to_string(),
                    detail,
                })?;
                run.record_outcome(outcome);
                self.emit(ExecutionEvent::PipelineStopped {
                    job_name: job.name().to_string(),
                    completed: run.completed_count(),
                    total_jobs,
                })?;
            }
        }

        if matches!(run.state(), RunState::Succeeded) {
            self.emit(ExecutionEvent::PipelineSucceeded {
                completed: run.completed_count(),
            })?;
        }

        info!(
            pipeline = %self.pipeline_name,
            completed = run.completed_count(),
            total_jobs,
            "pipeline run finished"
        );

        let log_path = self.logger.log_path().map(|p| p.to_path_buf());
        Ok(run.into_result(log_path))
    }
}
