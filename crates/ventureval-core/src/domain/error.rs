//! Error taxonomy for the evaluation engine.
//!
//! Only [`ConfigError`] ever reaches a caller of the pipeline. Evaluator
//! failures are folded into `Failure` task results at the executor boundary.

/// Errors raised by an evaluator while producing its output.
#[derive(Debug, thiserror::Error)]
pub enum EvaluatorError {
    #[error("evaluator failed: {0}")]
    Failed(String),

    #[error("evaluator returned an empty response")]
    EmptyResponse,

    #[error("malformed evaluator output: {0}")]
    MalformedOutput(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors produced when building a [`Context`](crate::domain::context::Context).
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("context must be a JSON object, got {kind}")]
    NotAnObject { kind: &'static str },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Deployment / wiring defects detected before any evaluation runs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required evaluators: {missing:?}")]
    MissingEvaluators { missing: Vec<String> },

    #[error("scoring weights must sum to 1.0, got {sum}")]
    WeightsDoNotSumToOne { sum: f64 },

    #[error("scoring weight for {component} must be a finite non-negative number, got {value}")]
    InvalidWeight { component: String, value: f64 },

    #[error("invalid risk thresholds: low_risk={low_risk}, medium_risk={medium_risk}")]
    InvalidThresholds { low_risk: f64, medium_risk: f64 },

    #[error("default score must lie in [0, 1], got {0}")]
    InvalidDefaultScore(f64),

    #[error("invalid stage graph: {0}")]
    InvalidStageGraph(String),

    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_evaluators_lists_names() {
        let err = ConfigError::MissingEvaluators {
            missing: vec!["risk".to_string(), "longevity".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("risk"));
        assert!(msg.contains("longevity"));
    }

    #[test]
    fn test_evaluator_error_display() {
        assert_eq!(
            EvaluatorError::EmptyResponse.to_string(),
            "evaluator returned an empty response"
        );
        let err = EvaluatorError::Failed("upstream timeout".to_string());
        assert!(err.to_string().contains("upstream timeout"));
    }

    #[test]
    fn test_weights_error_reports_sum() {
        let err = ConfigError::WeightsDoNotSumToOne { sum: 0.9 };
        assert!(err.to_string().contains("0.9"));
    }
}
