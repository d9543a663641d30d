//! Evaluator capability and registry.
//!
//! The engine treats evaluators as opaque: given a [`Context`] they either
//! produce a JSON object or fail. How they do it (remote model call, local
//! computation) is not the engine's concern.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Context, EvaluatorError};

/// A named unit of analysis work.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Identity of the evaluator, stamped on every result it produces.
    fn name(&self) -> &str;

    /// Produce this evaluator's output for `context`.
    ///
    /// A non-object value is treated as malformed output and `null` as an
    /// empty response by the task executor.
    async fn evaluate(&self, context: &Context) -> Result<Value, EvaluatorError>;
}

/// The seven fixed evaluation tasks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatorKind {
    Validator,
    Financial,
    Market,
    Competition,
    Risk,
    Longevity,
    InvestorFit,
}

impl EvaluatorKind {
    /// All kinds in stage declaration order.
    pub const ALL: [EvaluatorKind; 7] = [
        EvaluatorKind::Validator,
        EvaluatorKind::Financial,
        EvaluatorKind::Market,
        EvaluatorKind::Competition,
        EvaluatorKind::Risk,
        EvaluatorKind::Longevity,
        EvaluatorKind::InvestorFit,
    ];

    /// Logical registry name.
    pub fn name(&self) -> &'static str {
        match self {
            EvaluatorKind::Validator => "validator",
            EvaluatorKind::Financial => "financial",
            EvaluatorKind::Market => "market",
            EvaluatorKind::Competition => "competition",
            EvaluatorKind::Risk => "risk",
            EvaluatorKind::Longevity => "longevity",
            EvaluatorKind::InvestorFit => "investor_fit",
        }
    }

    /// Short description of what the task analyses.
    pub fn description(&self) -> &'static str {
        match self {
            EvaluatorKind::Validator => "Validates submission consistency and completeness",
            EvaluatorKind::Financial => "Analyzes financial health from pre-computed metrics",
            EvaluatorKind::Market => "Estimates market size and growth",
            EvaluatorKind::Competition => "Assesses the competitive landscape and novelty",
            EvaluatorKind::Risk => "Identifies and scores critical risks",
            EvaluatorKind::Longevity => "Predicts medium-term survival probability",
            EvaluatorKind::InvestorFit => "Matches the subject with investor types and stages",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mapping from logical task name to evaluator instance.
#[derive(Clone, Default)]
pub struct EvaluatorRegistry {
    evaluators: BTreeMap<String, Arc<dyn Evaluator>>,
}

impl EvaluatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `evaluator` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, evaluator: Arc<dyn Evaluator>) {
        self.evaluators.insert(name.into(), evaluator);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, name: impl Into<String>, evaluator: Arc<dyn Evaluator>) -> Self {
        self.register(name, evaluator);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Evaluator>> {
        self.evaluators.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.evaluators.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.evaluators.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }

    /// Names from `required` with no registered evaluator, in input order.
    pub fn missing<'a>(&self, required: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        required
            .into_iter()
            .filter(|name| !self.contains(name))
            .map(str::to_string)
            .collect()
    }
}

impl fmt::Debug for EvaluatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluatorRegistry")
            .field("names", &self.evaluators.keys().collect::<Vec<_>>())
            .finish()
    }
}
