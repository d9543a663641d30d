//! Folding a run's outputs into its final result object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::OutputMap;

/// Success/failure counts for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Everything a pipeline run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationResult {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub outputs: OutputMap,
    pub summary: RunSummary,
}

impl OrchestrationResult {
    /// Names of the tasks that failed, in output order.
    pub fn failed_tasks(&self) -> Vec<&str> {
        self.outputs
            .iter()
            .filter(|(_, result)| result.is_failure())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn duration_ms(&self) -> u64 {
        (self.completed_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }
}

/// Package `outputs` into an [`OrchestrationResult`] completed now.
///
/// Total for any input, including an empty map.
pub fn aggregate(outputs: OutputMap, started_at: DateTime<Utc>) -> OrchestrationResult {
    let total = outputs.len();
    let failed = outputs.values().filter(|r| r.is_failure()).count();

    OrchestrationResult {
        started_at,
        completed_at: Utc::now(),
        outputs,
        summary: RunSummary {
            total,
            succeeded: total - failed,
            failed,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExecutionMeta, TaskResult};
    use serde_json::json;

    fn meta(task: &str) -> ExecutionMeta {
        let now = Utc::now();
        ExecutionMeta {
            task: task.to_string(),
            started_at: now,
            completed_at: now,
        }
    }

    #[test]
    fn test_aggregation_structure() {
        let started_at = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("parse RFC3339")
            .with_timezone(&Utc);

        let mut outputs = OutputMap::new();
        outputs.insert(
            "validator".to_string(),
            TaskResult::success(meta("validator"), json!({"score": 0.9}).as_object().cloned().unwrap()),
        );
        outputs.insert(
            "financial".to_string(),
            TaskResult::failure(meta("financial"), "timeout"),
        );

        let result = aggregate(outputs, started_at);

        assert_eq!(result.started_at, started_at);
        assert!(result.completed_at >= started_at);
        assert_eq!(
            result.summary,
            RunSummary {
                total: 2,
                succeeded: 1,
                failed: 1
            }
        );
        assert_eq!(result.failed_tasks(), vec!["financial"]);
    }

    #[test]
    fn test_empty_outputs_are_well_formed() {
        let result = aggregate(OutputMap::new(), Utc::now());
        assert_eq!(result.summary.total, 0);
        assert_eq!(result.summary.succeeded, 0);
        assert_eq!(result.summary.failed, 0);
        assert!(result.outputs.is_empty());
    }

    #[test]
    fn test_counts_for_many_failures() {
        let mut outputs = OutputMap::new();
        for i in 0..9 {
            let name = format!("task_{i}");
            let result = if i % 3 == 0 {
                TaskResult::failure(meta(&name), "boom")
            } else {
                TaskResult::success(meta(&name), Default::default())
            };
            outputs.insert(name, result);
        }

        let summary = aggregate(outputs, Utc::now()).summary;
        assert_eq!(summary.total, 9);
        assert_eq!(summary.failed, 3);
        assert_eq!(summary.succeeded, 6);
    }
}
