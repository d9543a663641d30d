//! Layering upstream task outputs onto a base context.
//!
//! Downstream tasks see upstream results under `upstream_outputs`. A failed
//! upstream task is reduced to `{ "error": true, "message": ... }` so it can
//! never be consumed as if it were a valid payload.

use serde_json::{json, Map, Value};

use crate::domain::{Context, TaskOutcome, TaskResult, UPSTREAM_OUTPUTS_KEY};

/// Build a new context from `base` plus the given upstream results.
///
/// Entries already present under `upstream_outputs` in `base` are kept and
/// overlaid by `additions`. With no additions the result is a plain copy of
/// `base`. Neither `base` nor any addition is modified.
pub fn merge_context<'a, I>(base: &Context, additions: I) -> Context
where
    I: IntoIterator<Item = (&'a str, &'a TaskResult)>,
{
    let mut additions = additions.into_iter().peekable();
    if additions.peek().is_none() {
        return base.clone();
    }

    let mut upstream: Map<String, Value> = match base.get(UPSTREAM_OUTPUTS_KEY) {
        Some(Value::Object(existing)) => existing.clone(),
        _ => Map::new(),
    };

    for (name, result) in additions {
        upstream.insert(name.to_string(), upstream_entry(result));
    }

    base.with(UPSTREAM_OUTPUTS_KEY, Value::Object(upstream))
}

/// The value a downstream task sees for one upstream result.
pub fn upstream_entry(result: &TaskResult) -> Value {
    match &result.outcome {
        TaskOutcome::Success { fields } => Value::Object(fields.clone()),
        TaskOutcome::Failure { message } => json!({ "error": true, "message": message }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExecutionMeta;
    use chrono::Utc;

    fn meta(task: &str) -> ExecutionMeta {
        let now = Utc::now();
        ExecutionMeta {
            task: task.to_string(),
            started_at: now,
            completed_at: now,
        }
    }

    fn success(task: &str, fields: Value) -> TaskResult {
        TaskResult::success(meta(task), fields.as_object().cloned().unwrap())
    }

    fn base() -> Context {
        Context::from_value(json!({"startup": "test", "metrics": {"burn": 10}})).unwrap()
    }

    #[test]
    fn test_merge_does_not_mutate_original() {
        let base = base();
        let snapshot = base.clone();
        let financial = success("financial", json!({"score": 0.9}));

        let merged = merge_context(&base, [("financial", &financial)]);

        assert!(merged.contains_key(UPSTREAM_OUTPUTS_KEY));
        assert!(!base.contains_key(UPSTREAM_OUTPUTS_KEY));
        assert_eq!(base, snapshot);
    }

    #[test]
    fn test_merge_includes_upstream() {
        let financial = success("financial", json!({"score": 0.9}));
        let market = success("market", json!({"tam": 1000}));

        let merged = merge_context(&base(), [("financial", &financial), ("market", &market)]);

        assert_eq!(merged.upstream("financial"), Some(&json!({"score": 0.9})));
        assert_eq!(merged.upstream("market"), Some(&json!({"tam": 1000})));
        assert_eq!(merged.get("startup"), Some(&json!("test")));
    }

    #[test]
    fn test_failures_become_error_markers() {
        let broken = TaskResult::failure(meta("financial"), "failed");

        let merged = merge_context(&base(), [("financial", &broken)]);

        assert_eq!(
            merged.upstream("financial"),
            Some(&json!({"error": true, "message": "failed"}))
        );
        assert!(merged.upstream_failed("financial"));
    }

    #[test]
    fn test_existing_upstream_entries_are_kept() {
        let base = Context::from_value(json!({
            "upstream_outputs": {"seed": {"note": "from caller"}}
        }))
        .unwrap();
        let risk = success("risk", json!({"risk_severity_score": 0.2}));

        let merged = merge_context(&base, [("risk", &risk)]);

        assert_eq!(merged.upstream("seed"), Some(&json!({"note": "from caller"})));
        assert!(merged.upstream("risk").is_some());
        assert!(base.upstream("risk").is_none());
    }

    #[test]
    fn test_no_additions_is_plain_copy() {
        let base = base();
        let merged = merge_context(&base, std::iter::empty::<(&str, &TaskResult)>());
        assert_eq!(merged, base);
        assert!(!merged.contains_key(UPSTREAM_OUTPUTS_KEY));
    }

    #[test]
    fn test_payload_is_not_aliased() {
        let financial = success("financial", json!({"nested": {"score": 0.4}}));
        let before = financial.clone();

        let merged = merge_context(&base(), [("financial", &financial)]);
        let derived = merged.with("extra", json!(1));

        assert_eq!(financial, before);
        assert_eq!(derived.upstream("financial"), Some(&json!({"nested": {"score": 0.4}})));
    }
}
