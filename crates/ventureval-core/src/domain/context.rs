//! Immutable evaluation context.
//!
//! A [`Context`] is the accumulated input for one evaluator invocation. It has
//! no in-place mutation API: deriving a new context (`with`, or the context
//! merger) always yields a fresh value, and `Clone` is a structural deep copy
//! of the underlying JSON tree.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::error::ContextError;

/// Key under which upstream task outputs are layered onto a base context.
pub const UPSTREAM_OUTPUTS_KEY: &str = "upstream_outputs";

/// Immutable string-keyed mapping of JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    fields: Map<String, Value>,
}

impl Context {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, ContextError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(ContextError::NotAnObject {
                kind: json_kind(&other),
            }),
        }
    }

    /// Parse a context from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ContextError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Deep copy of the context as a JSON object value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// A new context with `key` set to `value`. `self` is left untouched.
    pub fn with(&self, key: impl Into<String>, value: Value) -> Self {
        let mut fields = self.fields.clone();
        fields.insert(key.into(), value);
        Self { fields }
    }

    /// The upstream output recorded for `task`, if any.
    pub fn upstream(&self, task: &str) -> Option<&Value> {
        self.fields
            .get(UPSTREAM_OUTPUTS_KEY)
            .and_then(|upstream| upstream.get(task))
    }

    /// Whether the upstream output for `task` is a failure marker.
    pub fn upstream_failed(&self, task: &str) -> bool {
        self.upstream(task)
            .and_then(|value| value.get("error"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

impl From<Map<String, Value>> for Context {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl TryFrom<Value> for Context {
    type Error = ContextError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
