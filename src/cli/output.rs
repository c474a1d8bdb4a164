//! CLI output formatting

use jobchain::core::config::{JobConfig, PipelineConfig};
use jobchain::{PipelineResult, PipelineStatus};
use console::Emoji;
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "- ");

/// Final status line for a run
pub fn format_result(pipeline_name: &str, result: &PipelineResult) -> String {
    let elapsed = result
        .finished_at
        .signed_duration_since(result.started_at)
        .to_std()
        .unwrap_or_default();

    match &result.status {
        PipelineStatus::Succeeded => format!(
            "{} {} completed {} ({}/{} jobs in {})",
            CHECK,
            style(pipeline_name).bold(),
            style("successfully").green(),
            result.completed_count,
            result.total_jobs,
            format_duration(elapsed)
        ),
        PipelineStatus::Failed {
            job_name, outcome, ..
        } => format!(
            "{} {} {} at job {} ({}/{} jobs completed): {}",
            CROSS,
            style(pipeline_name).bold(),
            style("failed").red(),
            style(job_name).cyan(),
            result.completed_count,
            result.total_jobs,
            style(outcome.detail()).dim()
        ),
        PipelineStatus::Incomplete { next_job } => format!(
            "{} {} {} before job #{} ({}/{} jobs completed)",
            CROSS,
            style(pipeline_name).bold(),
            style("stopped").red(),
            next_job + 1,
            result.completed_count,
            result.total_jobs
        ),
    }
}

/// Heading of `list` output, with the description when there is one
pub fn format_list_heading(config: &PipelineConfig) -> String {
    let heading = format!(
        "{} Jobs in {} (execution order):",
        INFO,
        style(&config.name).bold()
    );
    match &config.description {
        Some(description) => format!("{}\n   {}", heading, style(description).dim()),
        None => heading,
    }
}

/// One line of `list` output
pub fn format_job_entry(position: usize, job: &JobConfig) -> String {
    let command = job.to_job().command_line();
    if job.enabled {
        format!(
            "  {:>2}. {} {}",
            position,
            style(&job.name).bold(),
            style(command).dim()
        )
    } else {
        format!(
            "  {:>2}. {}{} {} {}",
            position,
            SKIP,
            style(&job.name).dim(),
            style(command).dim(),
            style("(disabled)").yellow()
        )
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
