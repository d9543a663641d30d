//! Final evaluation report assembly and rendering.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ConfigError, ConfigResult, OutputMap};
use crate::metrics::METRICS;
use crate::obs;
use crate::scoring::ScoringResult;

/// Categorical risk derived from the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLabel {
    LowRisk,
    MediumRisk,
    HighRisk,
}

impl RiskLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::LowRisk => "LOW_RISK",
            RiskLabel::MediumRisk => "MEDIUM_RISK",
            RiskLabel::HighRisk => "HIGH_RISK",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exclusive lower bounds for the low and medium risk labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Scores strictly above this are `LOW_RISK`.
    pub low_risk: f64,
    /// Scores strictly above this (and not low) are `MEDIUM_RISK`.
    pub medium_risk: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low_risk: 0.75,
            medium_risk: 0.50,
        }
    }
}

impl RiskThresholds {
    pub fn label(&self, score: f64) -> RiskLabel {
        if score > self.low_risk {
            RiskLabel::LowRisk
        } else if score > self.medium_risk {
            RiskLabel::MediumRisk
        } else {
            RiskLabel::HighRisk
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        if in_range(self.low_risk) && in_range(self.medium_risk) && self.medium_risk < self.low_risk
        {
            Ok(())
        } else {
            Err(ConfigError::InvalidThresholds {
                low_risk: self.low_risk,
                medium_risk: self.medium_risk,
            })
        }
    }
}

/// Per-task outcome summary of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub tasks_succeeded: usize,
    pub tasks_failed: usize,
    pub succeeded_tasks: Vec<String>,
    pub failed_tasks: Vec<String>,
    pub final_score: f64,
}

/// Structured evaluation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub report_id: Uuid,
    pub subject_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
    pub final_score: f64,
    pub risk_label: RiskLabel,
    pub evaluated_at: DateTime<Utc>,
    pub component_scores: IndexMap<String, f64>,
    pub weights_used: IndexMap<String, f64>,
    pub task_results: OutputMap,
    pub summary: ReportSummary,
}

/// Assemble a [`Report`]. Inputs are left untouched.
pub fn build_report(
    subject_id: &str,
    outputs: &OutputMap,
    scoring: &ScoringResult,
    thresholds: &RiskThresholds,
) -> Report {
    let (failed, succeeded): (Vec<_>, Vec<_>) =
        outputs.iter().partition(|(_, result)| result.is_failure());
    let names = |entries: Vec<(&String, _)>| -> Vec<String> {
        entries.into_iter().map(|(name, _)| name.clone()).collect()
    };
    let succeeded_tasks = names(succeeded);
    let failed_tasks = names(failed);
    let risk_label = thresholds.label(scoring.final_score);

    METRICS.inc_reports();
    obs::emit_report_built(subject_id, scoring.final_score, risk_label.as_str());

    Report {
        report_id: Uuid::new_v4(),
        subject_id: subject_id.to_string(),
        subject_name: None,
        final_score: scoring.final_score,
        risk_label,
        evaluated_at: Utc::now(),
        component_scores: scoring.component_scores.clone(),
        weights_used: scoring.weights_used.clone(),
        task_results: outputs.clone(),
        summary: ReportSummary {
            tasks_succeeded: succeeded_tasks.len(),
            tasks_failed: failed_tasks.len(),
            succeeded_tasks,
            failed_tasks,
            final_score: scoring.final_score,
        },
    }
}

/// Render a report as markdown for humans.
pub fn render_report_md(report: &Report) -> String {
    let mut out = String::new();
    let title = report.subject_name.as_deref().unwrap_or(&report.subject_id);
    out.push_str(&format!("# Evaluation Report: {}\n\n", title));
    out.push_str(&format!(
        "- subject: `{}`\n- final score: {:.4}\n- risk: {}\n- evaluated at: {}\n\n",
        report.subject_id,
        report.final_score,
        report.risk_label,
        report.evaluated_at.to_rfc3339()
    ));

    out.push_str("## Components\n\n");
    out.push_str("| component | score | weight |\n|---|---|---|\n");
    for (name, score) in &report.component_scores {
        let weight = report.weights_used.get(name).copied().unwrap_or_default();
        out.push_str(&format!("| {} | {:.4} | {:.2} |\n", name, score, weight));
    }
    out.push('\n');

    out.push_str("## Tasks\n\n");
    out.push_str(&format!(
        "- succeeded: {}\n- failed: {}\n",
        report.summary.tasks_succeeded, report.summary.tasks_failed
    ));
    for (name, result) in &report.task_results {
        if let Some(message) = result.error_message() {
            out.push_str(&format!("- `{}` failed: {}\n", name, message));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExecutionMeta, TaskResult};
    use crate::scoring::{score, ScoringConfig};

    fn meta(task: &str) -> ExecutionMeta {
        let now = Utc::now();
        ExecutionMeta {
            task: task.to_string(),
            started_at: now,
            completed_at: now,
        }
    }

    #[test]
    fn test_label_boundaries() {
        let t = RiskThresholds::default();
        assert_eq!(t.label(0.76), RiskLabel::LowRisk);
        assert_eq!(t.label(0.75), RiskLabel::MediumRisk);
        assert_eq!(t.label(0.51), RiskLabel::MediumRisk);
        assert_eq!(t.label(0.50), RiskLabel::HighRisk);
        assert_eq!(t.label(0.0), RiskLabel::HighRisk);
        assert_eq!(t.label(1.0), RiskLabel::LowRisk);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(RiskThresholds::default().validate().is_ok());
        let inverted = RiskThresholds {
            low_risk: 0.4,
            medium_risk: 0.6,
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_label_serializes_screaming_case() {
        assert_eq!(
            serde_json::to_value(RiskLabel::MediumRisk).unwrap(),
            serde_json::json!("MEDIUM_RISK")
        );
    }

    #[test]
    fn test_summary_lists_task_names() {
        let mut outputs = OutputMap::new();
        outputs.insert(
            "validator".to_string(),
            TaskResult::success(meta("validator"), Default::default()),
        );
        outputs.insert(
            "financial".to_string(),
            TaskResult::failure(meta("financial"), "timeout"),
        );
        let snapshot = outputs.clone();
        let scoring = score(&outputs, &ScoringConfig::default());

        let report = build_report("startup-1", &outputs, &scoring, &RiskThresholds::default());

        assert_eq!(outputs, snapshot);
        assert_eq!(report.subject_id, "startup-1");
        assert_eq!(report.summary.succeeded_tasks, vec!["validator"]);
        assert_eq!(report.summary.failed_tasks, vec!["financial"]);
        assert_eq!(report.summary.tasks_succeeded, 1);
        assert_eq!(report.summary.tasks_failed, 1);
        assert_eq!(report.final_score, 0.5);
        assert_eq!(report.risk_label, RiskLabel::HighRisk);
        assert_eq!(report.task_results.len(), 2);
    }

    #[test]
    fn test_markdown_mentions_failures() {
        let mut outputs = OutputMap::new();
        outputs.insert(
            "market".to_string(),
            TaskResult::failure(meta("market"), "rate limited"),
        );
        let scoring = score(&outputs, &ScoringConfig::default());
        let mut report = build_report("s-9", &outputs, &scoring, &RiskThresholds::default());
        report.subject_name = Some("Acme Robotics".to_string());

        let md = render_report_md(&report);
        assert!(md.starts_with("# Evaluation Report: Acme Robotics"));
        assert!(md.contains("| financial | 0.5000 | 0.30 |"));
        assert!(md.contains("`market` failed: rate limited"));
        assert!(md.contains("- risk: HIGH_RISK"));
    }
}
