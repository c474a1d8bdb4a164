//! Execution state models

use crate::core::{Job, JobOutcome};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::warn;
use uuid::Uuid;

/// Progress of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    /// Run has been created but not started
    NotStarted,
    /// Job at `job_index` is in flight
    Running { job_index: usize },
    /// Every job reached Success
    Succeeded,
    /// Job at `job_index` did not succeed; nothing after it ran
    Failed { job_index: usize, outcome: JobOutcome },
}

impl RunState {
    /// Check if the run reached a final state
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed { .. })
    }
}

/// Transient state for one invocation of the whole job list
#[derive(Debug, Clone)]
pub struct PipelineRun {
    run_id: Uuid,
    jobs: Vec<Job>,
    completed_count: usize,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    state: RunState,
}

impl PipelineRun {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            jobs,
            completed_count: 0,
            started_at: Utc::now(),
            finished_at: None,
            state: RunState::NotStarted,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn completed_count(&self) -> usize {
        self.completed_count
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Move out of `NotStarted`. An empty job list succeeds immediately.
    pub fn start(&mut self) {
        if !matches!(self.state, RunState::NotStarted) {
            warn!(run_id = %self.run_id, state = ?self.state, "ignoring start of a run that already started");
            return;
        }

        self.started_at = Utc::now();
        if self.jobs.is_empty() {
            self.finish(RunState::Succeeded);
        } else {
            self.state = RunState::Running { job_index: 0 };
        }
    }

    /// The job currently in flight, if any
    pub fn current_job(&self) -> Option<(usize, &Job)> {
        match self.state {
            RunState::Running { job_index } => self.jobs.get(job_index).map(|job| (job_index, job)),
            _ => None,
        }
    }

    /// Apply the outcome of the job in flight.
    ///
    /// Success advances to the next job (or to `Succeeded` after the last
    /// one); anything else moves straight to `Failed`. Outcomes reported
    /// outside `Running` are ignored.
    pub fn record_outcome(&mut self, outcome: JobOutcome) {
        let job_index = match self.state {
            RunState::Running { job_index } => job_index,
            _ => {
                warn!(run_id = %self.run_id, state = ?self.state, "ignoring job outcome outside a running job");
                return;
            }
        };

        if outcome.is_success() {
            self.completed_count += 1;
            let next = job_index + 1;
            if next < self.jobs.len() {
                self.state = RunState::Running { job_index: next };
            } else {
                self.finish(RunState::Succeeded);
            }
        } else {
            self.finish(RunState::Failed { job_index, outcome });
        }
    }

    fn finish(&mut self, state: RunState) {
        self.state = state;
        self.finished_at = Some(Utc::now());
    }

    /// Summarize the run. A run that never reached a terminal state is
    /// reported as `Incomplete`.
    pub fn into_result(self, log_path: Option<PathBuf>) -> PipelineResult {
        let status = match self.state {
            RunState::Succeeded => PipelineStatus::Succeeded,
            RunState::Failed { job_index, outcome } => PipelineStatus::Failed {
                job_index,
                job_name: self.jobs[job_index].name().to_string(),
                outcome,
            },
            RunState::NotStarted => PipelineStatus::Incomplete { next_job: 0 },
            RunState::Running { job_index } => PipelineStatus::Incomplete { next_job: job_index },
        };

        PipelineResult {
            run_id: self.run_id,
            completed_count: self.completed_count,
            total_jobs: self.jobs.len(),
            started_at: self.started_at,
            finished_at: self.finished_at.unwrap_or_else(Utc::now),
            status,
            log_path,
        }
    }
}

/// Overall outcome of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStatus {
    Succeeded,
    Failed {
        job_index: usize,
        job_name: String,
        outcome: JobOutcome,
    },
    /// Run was abandoned before reaching a terminal state
    Incomplete { next_job: usize },
}

/// Terminal summary of a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub completed_count: usize,
    pub total_jobs: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: PipelineStatus,
    /// Durable log location, when the run log is file-backed
    pub log_path: Option<PathBuf>,
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        matches!(self.status, PipelineStatus::Succeeded)
    }

    /// Process exit status for this run: 0 on success, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}
