//! Test: Log Append - same-day runs share one file and never rewrite it

use crate::helpers::*;
use chrono::NaiveDate;
use jobchain::persistence::log_file_path;
use jobchain::{FileSink, JobStatus, Orchestrator, RunLogger};
use std::fs;

async fn run_into_file(path: &std::path::Path, names: &[&str], script: &[(&str, JobStatus)]) {
    let logger = RunLogger::durable_only(FileSink::open(path).unwrap());
    Orchestrator::new(ScriptedExecutor::new(script), &logger)
        .with_name("scenario")
        .run_all(jobs(names))
        .await
        .unwrap();
}

/// Three runs on the same day append in order; nothing earlier changes
#[tokio::test]
async fn test_same_day_runs_append() {
    let dir = tempfile::tempdir().unwrap();
    let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let path = log_file_path(dir.path(), "pipeline", day);

    run_into_file(&path, &["A", "B"], &[]).await;
    let after_first = fs::read_to_string(&path).unwrap();

    run_into_file(&path, &["A", "B"], &[("B", JobStatus::NonZeroExit(1))]).await;
    let after_second = fs::read_to_string(&path).unwrap();

    run_into_file(&path, &["C"], &[]).await;
    let after_third = fs::read_to_string(&path).unwrap();

    assert!(after_second.starts_with(&after_first));
    assert!(after_third.starts_with(&after_second));

    let headers = after_third
        .lines()
        .filter(|line| line.contains("Pipeline 'scenario' started"))
        .count();
    assert_eq!(headers, 3);

    let endings: Vec<&str> = after_third
        .lines()
        .filter(|line| line.contains("Full pipeline success") || line.contains("Pipeline stopped"))
        .map(|line| line.split_once("] ").unwrap().1)
        .collect();
    assert_eq!(
        endings,
        vec![
            "Full pipeline success: 2 job(s) completed",
            "Pipeline stopped at job 'B' (1/2 jobs completed)",
            "Full pipeline success: 1 job(s) completed",
        ]
    );
}

/// Every line carries a timestamp and timestamps never go backwards
#[tokio::test]
async fn test_lines_are_timestamped_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline-2024-06-01.log");

    run_into_file(&path, &["A", "B", "C"], &[]).await;

    let content = fs::read_to_string(&path).unwrap();
    let stamps: Vec<chrono::DateTime<chrono::FixedOffset>> = content
        .lines()
        .map(|line| {
            let stamp = line
                .strip_prefix('[')
                .and_then(|rest| rest.split_once(']'))
                .map(|(stamp, _)| stamp)
                .unwrap();
            chrono::DateTime::parse_from_rfc3339(stamp).unwrap()
        })
        .collect();

    assert_eq!(stamps.len(), 8);
    assert!(stamps.windows(2).all(|pair| pair[0] <= pair[1]));
}

/// A new calendar day gets its own file
#[tokio::test]
async fn test_new_day_new_file() {
    let dir = tempfile::tempdir().unwrap();
    let monday = log_file_path(dir.path(), "pipeline", NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
    let tuesday = log_file_path(dir.path(), "pipeline", NaiveDate::from_ymd_opt(2024, 6, 4).unwrap());

    run_into_file(&monday, &["A"], &[]).await;
    run_into_file(&tuesday, &["A"], &[]).await;

    assert_ne!(monday, tuesday);
    assert_eq!(fs::read_to_string(&monday).unwrap().lines().count(), 4);
    assert_eq!(fs::read_to_string(&tuesday).unwrap().lines().count(), 4);
}
