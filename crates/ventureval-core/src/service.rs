//! Scoring, report assembly and optional persistence behind one call.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::domain::ConfigResult;
use crate::obs;
use crate::orchestration::OrchestrationResult;
use crate::report::{build_report, Report};
use crate::scoring::score;
use crate::store::ReportStore;

/// Outcome of trying to persist a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceStatus {
    pub saved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PersistenceStatus {
    fn saved(location: String) -> Self {
        Self {
            saved: true,
            location: Some(location),
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            saved: false,
            location: None,
            error: Some(error),
        }
    }

    fn disabled() -> Self {
        Self {
            saved: false,
            location: None,
            error: None,
        }
    }
}

/// A report together with its persistence outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
    pub report: Report,
    pub persistence: PersistenceStatus,
}

/// Turns orchestration results into reports.
#[derive(Clone)]
pub struct EvaluationService {
    config: EngineConfig,
    store: Option<Arc<dyn ReportStore>>,
}

impl EvaluationService {
    /// Service with a validated config and no store.
    pub fn new(config: EngineConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store: None,
        })
    }

    pub fn with_store(mut self, store: Arc<dyn ReportStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score and assemble a report. Pure apart from logging.
    pub fn evaluate(&self, subject_id: &str, result: &OrchestrationResult) -> Report {
        let scoring = score(&result.outputs, &self.config.scoring);
        build_report(subject_id, &result.outputs, &scoring, &self.config.thresholds)
    }

    /// [`evaluate`](Self::evaluate) with a display name attached.
    pub fn evaluate_named(
        &self,
        subject_id: &str,
        subject_name: Option<&str>,
        result: &OrchestrationResult,
    ) -> Report {
        let mut report = self.evaluate(subject_id, result);
        report.subject_name = subject_name.map(str::to_string);
        report
    }

    /// Evaluate, then persist through the configured store.
    ///
    /// Store failures are logged and reported in the returned status; the
    /// report is still returned.
    pub fn evaluate_and_store(
        &self,
        subject_id: &str,
        subject_name: Option<&str>,
        result: &OrchestrationResult,
    ) -> StoredReport {
        let report = self.evaluate_named(subject_id, subject_name, result);

        let persistence = match &self.store {
            None => PersistenceStatus::disabled(),
            Some(store) => match store.save(&report) {
                Ok(location) => PersistenceStatus::saved(location),
                Err(err) => {
                    obs::emit_report_store_error(subject_id, &err);
                    PersistenceStatus::failed(err.to_string())
                }
            },
        };

        StoredReport {
            report,
            persistence,
        }
    }
}

impl std::fmt::Debug for EvaluationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationService")
            .field("config", &self.config)
            .field("store", &self.store.is_some())
            .finish()
    }
}
