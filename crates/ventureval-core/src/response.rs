//! Text-producing evaluators.
//!
//! Model-backed evaluators usually answer with prose wrapped around a JSON
//! object, sometimes inside a markdown code fence. [`TextEvaluator`] adapts any
//! [`TextResponder`] into an [`Evaluator`] by rendering the context as the
//! prompt and pulling the JSON object back out of the reply.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::{Context, EvaluatorError};
use crate::evaluator::Evaluator;

/// Number of characters of an unparseable reply quoted in the error.
const SNIPPET_CHARS: usize = 200;

/// A backend that answers a prompt with free text.
#[async_trait]
pub trait TextResponder: Send + Sync {
    async fn respond(&self, prompt: &str) -> Result<String, EvaluatorError>;
}

/// Extract a JSON object from a free-text reply.
///
/// Strips markdown code fences, then tries a direct parse, then the outermost
/// `{ ... }` span.
pub fn extract_json(text: &str) -> Result<Map<String, Value>, EvaluatorError> {
    let mut text = text.trim().to_string();

    if text.starts_with("```") {
        text = text
            .lines()
            .filter(|line| !line.trim().starts_with("```"))
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&text) {
        return Ok(map);
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if end > start {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&text[start..=end]) {
                return Ok(map);
            }
        }
    }

    let snippet: String = text.chars().take(SNIPPET_CHARS).collect();
    Err(EvaluatorError::MalformedOutput(format!(
        "could not extract a JSON object from response: {snippet}"
    )))
}

/// [`Evaluator`] over a [`TextResponder`].
pub struct TextEvaluator<R> {
    name: String,
    responder: R,
}

impl<R: TextResponder> TextEvaluator<R> {
    pub fn new(name: impl Into<String>, responder: R) -> Self {
        Self {
            name: name.into(),
            responder,
        }
    }

    pub fn responder(&self) -> &R {
        &self.responder
    }
}

#[async_trait]
impl<R: TextResponder> Evaluator for TextEvaluator<R> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self, context: &Context) -> Result<Value, EvaluatorError> {
        let prompt = serde_json::to_string_pretty(context)?;
        let reply = self.responder.respond(&prompt).await?;
        if reply.trim().is_empty() {
            return Err(EvaluatorError::EmptyResponse);
        }
        extract_json(&reply).map(Value::Object)
    }
}
