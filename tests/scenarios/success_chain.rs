//! Test: Success Chain - every job succeeds and the run reports success

use crate::helpers::*;
use jobchain::PipelineStatus;

/// Two jobs, both succeed
#[tokio::test]
async fn test_two_jobs_succeed() {
    let run = run_scripted(&["A", "B"], &[]).await;

    assert_eq!(run.calls, vec!["A", "B"]);
    assert_eq!(run.result.completed_count, 2);
    assert_eq!(run.result.status, PipelineStatus::Succeeded);
    assert_eq!(run.result.exit_code(), 0);

    assert_eq!(
        job_messages(&run.messages),
        vec![
            "Starting job 1/2: A",
            "Job 'A' succeeded in 0.0s",
            "Starting job 2/2: B",
            "Job 'B' succeeded in 0.0s",
            "Full pipeline success: 2 job(s) completed",
        ]
    );
}

/// The run header comes first and names the pipeline
#[tokio::test]
async fn test_run_header_precedes_jobs() {
    let run = run_scripted(&["only"], &[]).await;

    assert!(run.messages[0].starts_with("Pipeline 'scenario' started with 1 job(s) (run "));
    assert_eq!(run.messages[1], "Starting job 1/1: only");
}

/// Jobs run in declared order, never reordered
#[tokio::test]
async fn test_declared_order_is_kept() {
    let names = ["zeta", "alpha", "mid", "beta"];
    let run = run_scripted(&names, &[]).await;

    assert_eq!(run.calls, names);
    assert_eq!(run.result.completed_count, names.len());
    assert_eq!(run.result.total_jobs, names.len());
}

/// Nothing to do is a success
#[tokio::test]
async fn test_empty_job_list() {
    let run = run_scripted(&[], &[]).await;

    assert!(run.calls.is_empty());
    assert!(run.result.is_success());
    assert_eq!(run.result.completed_count, 0);
    assert_eq!(
        job_messages(&run.messages),
        vec!["Full pipeline success: 0 job(s) completed"]
    );
}
