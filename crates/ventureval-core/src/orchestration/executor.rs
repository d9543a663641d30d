//! Single-evaluator execution with failure isolation.
//!
//! [`execute_task`] is the only place evaluator code is invoked. Whatever the
//! evaluator does (error, panic, empty or non-object output) the caller gets
//! a [`TaskResult`] back, stamped with start and completion times.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use chrono::Utc;
use futures::FutureExt;
use serde_json::Value;

use crate::domain::{Context, EvaluatorError, ExecutionMeta, TaskResult};
use crate::evaluator::Evaluator;
use crate::metrics::METRICS;
use crate::obs;

/// Run `evaluator` once against `context`.
///
/// Never fails and never unwinds: every failure mode is folded into a
/// `Failure` result carrying the evaluator's name.
pub async fn execute_task(evaluator: &dyn Evaluator, context: &Context) -> TaskResult {
    let task = evaluator.name().to_string();
    let started_at = Utc::now();

    let outcome = AssertUnwindSafe(evaluator.evaluate(context))
        .catch_unwind()
        .await;

    let meta = ExecutionMeta {
        task,
        started_at,
        completed_at: Utc::now(),
    };

    let result = match outcome {
        Ok(Ok(Value::Object(fields))) => TaskResult::success(meta, fields),
        Ok(Ok(Value::Null)) => TaskResult::failure(meta, EvaluatorError::EmptyResponse.to_string()),
        Ok(Ok(other)) => TaskResult::failure(
            meta,
            EvaluatorError::MalformedOutput(format!("expected a JSON object, got {other}"))
                .to_string(),
        ),
        Ok(Err(err)) => TaskResult::failure(meta, err.to_string()),
        Err(panic) => TaskResult::failure(
            meta,
            format!("evaluator panicked: {}", panic_message(panic.as_ref())),
        ),
    };

    METRICS.record_task(result.is_failure());
    obs::emit_task_finished(result.task(), result.is_success(), result.meta.duration_ms());
    result
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
