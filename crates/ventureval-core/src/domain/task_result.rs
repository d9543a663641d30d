//! Task results and the output map they are collected into.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Conventional success field carrying an evaluator's confidence in [0, 1].
pub const CONFIDENCE_FIELD: &str = "confidence_score";

/// Mapping from task name to result, in stage declaration order.
pub type OutputMap = IndexMap<String, TaskResult>;

/// Execution metadata stamped on every result, success or failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMeta {
    /// Name of the evaluator that produced the result.
    pub task: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl ExecutionMeta {
    /// Wall-clock duration of the invocation in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        (self.completed_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }
}

/// Outcome of a single evaluator invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// Named fields produced by the evaluator.
    Success { fields: Map<String, Value> },
    /// Human-readable reason the invocation failed.
    Failure { message: String },
}

/// The result of running one evaluator against one context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub meta: ExecutionMeta,
    pub outcome: TaskOutcome,
}

impl TaskResult {
    pub fn success(meta: ExecutionMeta, fields: Map<String, Value>) -> Self {
        Self {
            meta,
            outcome: TaskOutcome::Success { fields },
        }
    }

    pub fn failure(meta: ExecutionMeta, message: impl Into<String>) -> Self {
        Self {
            meta,
            outcome: TaskOutcome::Failure {
                message: message.into(),
            },
        }
    }

    /// Name of the task that produced this result.
    pub fn task(&self) -> &str {
        &self.meta.task
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Success fields, or `None` for a failure.
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        match &self.outcome {
            TaskOutcome::Success { fields } => Some(fields),
            TaskOutcome::Failure { .. } => None,
        }
    }

    /// Failure message, or `None` for a success.
    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            TaskOutcome::Success { .. } => None,
            TaskOutcome::Failure { message } => Some(message),
        }
    }

    /// Look up a single success field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields().and_then(|fields| fields.get(name))
    }

    /// Reported confidence, clamped to [0, 1].
    pub fn confidence(&self) -> Option<f64> {
        self.field(CONFIDENCE_FIELD)
            .and_then(Value::as_f64)
            .filter(|c| c.is_finite())
            .map(|c| c.clamp(0.0, 1.0))
    }
}
