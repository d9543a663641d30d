//! Deterministic weighted scoring.
//!
//! Reduces a run's output map to one score in [0, 1]. Missing, failed or
//! non-numeric inputs resolve to a neutral default instead of an error, so
//! scoring is total.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ConfigError, ConfigResult, OutputMap};
use crate::evaluator::EvaluatorKind;

/// Source fields read from evaluator outputs.
pub const FINANCIAL_HEALTH_FIELD: &str = "financial_health_score";
pub const MARKET_GROWTH_FIELD: &str = "market_growth_score";
pub const RISK_SEVERITY_FIELD: &str = "risk_severity_score";
pub const DATA_CONSISTENCY_FIELD: &str = "data_consistency_score";
pub const COMPLETENESS_FIELD: &str = "completeness_score";

/// Neutral value substituted for anything missing or failed.
pub const DEFAULT_COMPONENT_SCORE: f64 = 0.5;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// The four weighted score components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreComponent {
    Financial,
    Market,
    Risk,
    Validator,
}

impl ScoreComponent {
    pub const ALL: [ScoreComponent; 4] = [
        ScoreComponent::Financial,
        ScoreComponent::Market,
        ScoreComponent::Risk,
        ScoreComponent::Validator,
    ];

    pub fn name(&self) -> &'static str {
        self.source().name()
    }

    /// Evaluator whose output feeds this component.
    pub fn source(&self) -> EvaluatorKind {
        match self {
            ScoreComponent::Financial => EvaluatorKind::Financial,
            ScoreComponent::Market => EvaluatorKind::Market,
            ScoreComponent::Risk => EvaluatorKind::Risk,
            ScoreComponent::Validator => EvaluatorKind::Validator,
        }
    }
}

/// Per-component weights. Must be non-negative and sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub financial: f64,
    pub market: f64,
    pub risk: f64,
    pub validator: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            financial: 0.30,
            market: 0.20,
            risk: 0.30,
            validator: 0.20,
        }
    }
}

impl ScoringWeights {
    pub fn get(&self, component: ScoreComponent) -> f64 {
        match component {
            ScoreComponent::Financial => self.financial,
            ScoreComponent::Market => self.market,
            ScoreComponent::Risk => self.risk,
            ScoreComponent::Validator => self.validator,
        }
    }

    pub fn sum(&self) -> f64 {
        ScoreComponent::ALL.iter().map(|c| self.get(*c)).sum()
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for component in ScoreComponent::ALL {
            let value = self.get(component);
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    component: component.name().to_string(),
                    value,
                });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightsDoNotSumToOne { sum });
        }
        Ok(())
    }
}

/// Scoring configuration injected into [`score`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    /// Value used for any missing or failed input.
    pub default_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            default_score: DEFAULT_COMPONENT_SCORE,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.default_score) {
            return Err(ConfigError::InvalidDefaultScore(self.default_score));
        }
        self.weights.validate()
    }
}

/// Final score with the components and weights it was computed from.
///
/// `component_scores` and `weights_used` always share the same keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub final_score: f64,
    pub component_scores: IndexMap<String, f64>,
    pub weights_used: IndexMap<String, f64>,
}

impl ScoringResult {
    pub fn component(&self, component: ScoreComponent) -> Option<f64> {
        self.component_scores.get(component.name()).copied()
    }
}

/// Reduce `outputs` to a [`ScoringResult`].
///
/// Entries other than the four scored components are ignored.
pub fn score(outputs: &OutputMap, config: &ScoringConfig) -> ScoringResult {
    let mut component_scores = IndexMap::new();
    let mut weights_used = IndexMap::new();
    let mut weighted_sum = 0.0;

    for component in ScoreComponent::ALL {
        let value = component_value(outputs, component, config.default_score);
        let weight = config.weights.get(component);
        weighted_sum += value * weight;
        component_scores.insert(component.name().to_string(), round4(value));
        weights_used.insert(component.name().to_string(), weight);
    }

    ScoringResult {
        final_score: round4(weighted_sum.clamp(0.0, 1.0)),
        component_scores,
        weights_used,
    }
}

fn component_value(outputs: &OutputMap, component: ScoreComponent, default: f64) -> f64 {
    let read = |field: &str| extract_score(outputs, component.source().name(), field, default);
    match component {
        ScoreComponent::Financial => read(FINANCIAL_HEALTH_FIELD),
        ScoreComponent::Market => read(MARKET_GROWTH_FIELD),
        // Lower severity is better.
        ScoreComponent::Risk => 1.0 - read(RISK_SEVERITY_FIELD),
        ScoreComponent::Validator => {
            (read(DATA_CONSISTENCY_FIELD) + read(COMPLETENESS_FIELD)) / 2.0
        }
    }
}

/// Read `task.field` as a number clamped to [0, 1], or `default`.
///
/// Numeric strings are accepted; failed tasks, missing fields and anything
/// non-numeric yield `default`.
pub fn extract_score(outputs: &OutputMap, task: &str, field: &str, default: f64) -> f64 {
    let value = outputs
        .get(task)
        .and_then(|result| result.field(field))
        .and_then(|value| match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|v| v.is_finite());

    match value {
        Some(v) => v.clamp(0.0, 1.0),
        None => default,
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExecutionMeta, TaskResult};
    use chrono::Utc;
    use serde_json::json;

    fn meta(task: &str) -> ExecutionMeta {
        let now = Utc::now();
        ExecutionMeta {
            task: task.to_string(),
            started_at: now,
            completed_at: now,
        }
    }

    fn outputs(entries: Vec<(&str, Value)>) -> OutputMap {
        entries
            .into_iter()
            .map(|(name, fields)| {
                (
                    name.to_string(),
                    TaskResult::success(meta(name), fields.as_object().cloned().unwrap()),
                )
            })
            .collect()
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!(ScoringWeights::default().validate().is_ok());
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn test_weight_validation() {
        let weights = ScoringWeights {
            financial: 0.5,
            ..ScoringWeights::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(ConfigError::WeightsDoNotSumToOne { .. })
        ));

        let weights = ScoringWeights {
            financial: -0.1,
            market: 0.6,
            ..ScoringWeights::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(ConfigError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_default_score_must_be_unit_interval() {
        let config = ScoringConfig {
            default_score: 1.5,
            ..ScoringConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDefaultScore(_))
        ));
    }

    #[test]
    fn test_extract_score_rules() {
        let map = outputs(vec![(
            "financial",
            json!({"a": 0.3, "b": "0.6", "c": 4.2, "d": -1, "e": "n/a", "f": null}),
        )]);

        assert_eq!(extract_score(&map, "financial", "a", 0.5), 0.3);
        assert_eq!(extract_score(&map, "financial", "b", 0.5), 0.6);
        assert_eq!(extract_score(&map, "financial", "c", 0.5), 1.0);
        assert_eq!(extract_score(&map, "financial", "d", 0.5), 0.0);
        assert_eq!(extract_score(&map, "financial", "e", 0.5), 0.5);
        assert_eq!(extract_score(&map, "financial", "f", 0.5), 0.5);
        assert_eq!(extract_score(&map, "financial", "missing", 0.5), 0.5);
        assert_eq!(extract_score(&map, "market", "a", 0.5), 0.5);
    }

    #[test]
    fn test_failed_task_uses_default() {
        let mut map = OutputMap::new();
        map.insert(
            "risk".to_string(),
            TaskResult::failure(meta("risk"), "timeout"),
        );

        let result = score(&map, &ScoringConfig::default());
        assert_eq!(result.component(ScoreComponent::Risk), Some(0.5));
    }

    #[test]
    fn test_keys_of_components_and_weights_match() {
        let result = score(&OutputMap::new(), &ScoringConfig::default());
        let components: Vec<&String> = result.component_scores.keys().collect();
        let weights: Vec<&String> = result.weights_used.keys().collect();
        assert_eq!(components, weights);
        assert_eq!(components, vec!["financial", "market", "risk", "validator"]);
    }

    #[test]
    fn test_final_score_is_rounded_to_four_places() {
        let map = outputs(vec![("financial", json!({"financial_health_score": 0.123456}))]);
        let result = score(&map, &ScoringConfig::default());
        // 0.123456 * 0.3 + 0.5 * 0.7 = 0.3870368
        assert_eq!(result.final_score, 0.387);
        assert_eq!(result.component(ScoreComponent::Financial), Some(0.1235));
    }
}
