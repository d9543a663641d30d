//! Order-preserving concurrent fan-out.
//!
//! Every invocation is spawned as its own tokio task and the runner waits for
//! all of them. Results are mapped back to input position, not completion
//! order. One invocation failing (or its task dying) never affects siblings.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinError;
use tracing::warn;

use crate::domain::{Context, ExecutionMeta, TaskResult};
use crate::evaluator::Evaluator;
use crate::orchestration::executor::{execute_task, panic_message};

/// Placeholder task name for an invocation that died without identifying itself.
pub const UNKNOWN_TASK: &str = "unknown";

/// One evaluator paired with the context it should run against.
#[derive(Clone)]
pub struct TaskInvocation {
    pub evaluator: Arc<dyn Evaluator>,
    pub context: Context,
}

impl TaskInvocation {
    pub fn new(evaluator: Arc<dyn Evaluator>, context: Context) -> Self {
        Self { evaluator, context }
    }
}

impl std::fmt::Debug for TaskInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskInvocation")
            .field("evaluator", &self.evaluator.name())
            .field("context_keys", &self.context.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Run `invocations` concurrently through the task executor.
///
/// `result[i]` always corresponds to `invocations[i]`.
pub async fn run_batch(invocations: Vec<TaskInvocation>) -> Vec<TaskResult> {
    let futures = invocations
        .into_iter()
        .map(|TaskInvocation { evaluator, context }| async move {
            execute_task(evaluator.as_ref(), &context).await
        })
        .collect();
    gather_ordered(futures).await
}

/// Spawn each future and collect their outputs in input order.
///
/// A future whose task panics or is cancelled yields a `Failure` tagged
/// [`UNKNOWN_TASK`] in its slot.
pub async fn gather_ordered<F>(futures: Vec<F>) -> Vec<TaskResult>
where
    F: Future<Output = TaskResult> + Send + 'static,
{
    let started_at = Utc::now();
    let handles: Vec<_> = futures.into_iter().map(tokio::spawn).collect();

    let mut results = Vec::with_capacity(handles.len());
    for (index, handle) in handles.into_iter().enumerate() {
        let result = match handle.await {
            Ok(result) => result,
            Err(err) => {
                warn!(index, error = %err, "batch invocation did not complete");
                unidentified_failure(started_at, err)
            }
        };
        results.push(result);
    }
    results
}

fn unidentified_failure(started_at: DateTime<Utc>, err: JoinError) -> TaskResult {
    let message = match err.try_into_panic() {
        Ok(payload) => format!("task panicked: {}", panic_message(payload.as_ref())),
        Err(err) => err.to_string(),
    };
    let meta = ExecutionMeta {
        task: UNKNOWN_TASK.to_string(),
        started_at,
        completed_at: Utc::now(),
    };
    TaskResult::failure(meta, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok(task: &str) -> TaskResult {
        let now = Utc::now();
        TaskResult::success(
            ExecutionMeta {
                task: task.to_string(),
                started_at: now,
                completed_at: now,
            },
            json!({"score": 1}).as_object().cloned().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_gather_preserves_input_order() {
        let futures: Vec<std::pin::Pin<Box<dyn Future<Output = TaskResult> + Send>>> = vec![
            Box::pin(async {
                tokio::time::sleep(std::time::Duration::from_millis(30)).await;
                ok("slow")
            }),
            Box::pin(async { ok("fast") }),
        ];

        let results = gather_ordered(futures).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].task(), "slow");
        assert_eq!(results[1].task(), "fast");
    }

    #[tokio::test]
    async fn test_panicking_future_gets_placeholder_name() {
        let futures: Vec<std::pin::Pin<Box<dyn Future<Output = TaskResult> + Send>>> = vec![
            Box::pin(async { ok("a") }),
            Box::pin(async {
                let explode = true;
                if explode {
                    panic!("boom");
                }
                ok("b")
            }),
            Box::pin(async { ok("c") }),
        ];

        let results = gather_ordered(futures).await;
        assert_eq!(results.len(), 3);
        assert!(results[0].is_success());
        assert!(results[1].is_failure());
        assert_eq!(results[1].task(), UNKNOWN_TASK);
        assert!(results[1].error_message().unwrap().contains("boom"));
        assert!(results[2].is_success());
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let results = run_batch(Vec::new()).await;
        assert!(results.is_empty());
    }
}
