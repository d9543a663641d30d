//! Fixture-backed evaluators for offline runs.
//!
//! A fixture file is a JSON object keyed by evaluator name. Each value is the
//! canned reply for that evaluator:
//!
//! - a JSON object, returned as pretty-printed text;
//! - a string, returned verbatim (prose around a JSON object is fine);
//! - `{"$fail": "message"}`, which makes the evaluator fail.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use ventureval_core::{EvaluatorError, EvaluatorRegistry, TextEvaluator, TextResponder};

/// Key marking a fixture as a failure.
pub const FAIL_KEY: &str = "$fail";

/// Canned response for one evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureResponder {
    Reply(String),
    Fail(String),
}

impl FixtureResponder {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => match map.get(FAIL_KEY) {
                Some(message) => Self::Fail(
                    message
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| message.to_string()),
                ),
                None => Self::Reply(
                    serde_json::to_string_pretty(map).unwrap_or_else(|_| value.to_string()),
                ),
            },
            Value::String(text) => Self::Reply(text.clone()),
            other => Self::Reply(other.to_string()),
        }
    }
}

#[async_trait]
impl TextResponder for FixtureResponder {
    async fn respond(&self, _prompt: &str) -> Result<String, EvaluatorError> {
        match self {
            Self::Reply(text) => Ok(text.clone()),
            Self::Fail(message) => Err(EvaluatorError::Failed(message.clone())),
        }
    }
}

/// One [`TextEvaluator`] per fixture entry.
pub fn registry_from_fixtures(fixtures: &Map<String, Value>) -> EvaluatorRegistry {
    fixtures
        .iter()
        .fold(EvaluatorRegistry::new(), |registry, (name, value)| {
            let evaluator = TextEvaluator::new(name.clone(), FixtureResponder::from_value(value));
            registry.with(name.clone(), Arc::new(evaluator))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use ventureval_core::{execute_task, Context};

    #[test]
    fn test_fixture_kinds() {
        assert_eq!(
            FixtureResponder::from_value(&json!({"$fail": "boom"})),
            FixtureResponder::Fail("boom".to_string())
        );
        assert_eq!(
            FixtureResponder::from_value(&json!("text {\"a\": 1}")),
            FixtureResponder::Reply("text {\"a\": 1}".to_string())
        );
        match FixtureResponder::from_value(&json!({"score": 0.4})) {
            FixtureResponder::Reply(text) => assert!(text.contains("\"score\": 0.4")),
            other => panic!("unexpected fixture: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_registry_evaluators_reply_with_fixtures() {
        let fixtures = json!({
            "financial": {"financial_health_score": 0.7},
            "market": {"$fail": "no market data"},
        });
        let registry = registry_from_fixtures(fixtures.as_object().unwrap());
        assert_eq!(registry.len(), 2);

        let context = Context::new();
        let financial = execute_task(registry.get("financial").unwrap().as_ref(), &context).await;
        assert_eq!(
            financial.field("financial_health_score"),
            Some(&json!(0.7))
        );

        let market = execute_task(registry.get("market").unwrap().as_ref(), &context).await;
        assert!(market.error_message().unwrap().contains("no market data"));
    }
}
