//! Structured lifecycle events for pipeline runs.
//!
//! Each emitter logs one event with an `event = "..."` field so runs can be
//! followed in JSON log output. Verbosity is controlled by `RUST_LOG`.

use tracing::{debug, info, warn};

/// Emit event: pipeline run started.
pub fn emit_pipeline_started(run_id: &str, stage_count: usize, task_count: usize) {
    info!(
        event = "pipeline.started",
        run_id = %run_id,
        stage_count = stage_count,
        task_count = task_count,
    );
}

/// Emit event: a stage is about to run.
pub fn emit_stage_started(stage: usize, tasks: &[String], parallel: bool) {
    debug!(
        event = "stage.started",
        stage = stage,
        tasks = ?tasks,
        parallel = parallel,
    );
}

/// Emit event: one evaluator invocation finished.
pub fn emit_task_finished(task: &str, success: bool, duration_ms: u64) {
    if success {
        debug!(event = "task.finished", task = %task, success, duration_ms);
    } else {
        warn!(event = "task.finished", task = %task, success, duration_ms);
    }
}

/// Emit event: pipeline run finished with its summary counts.
pub fn emit_pipeline_finished(run_id: &str, total: usize, succeeded: usize, failed: usize) {
    info!(
        event = "pipeline.finished",
        run_id = %run_id,
        total = total,
        succeeded = succeeded,
        failed = failed,
    );
}

/// Emit event: a report was assembled.
pub fn emit_report_built(subject_id: &str, final_score: f64, risk_label: &str) {
    info!(
        event = "report.built",
        subject_id = %subject_id,
        final_score = final_score,
        risk_label = %risk_label,
    );
}

/// Emit event: persisting a report failed (warning level).
pub fn emit_report_store_error(subject_id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "report.store_error", subject_id = %subject_id, error = %error);
}
