use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{validate_subject_id, ReportStore, Result};
use crate::report::Report;

/// In-memory report store keyed by subject id.
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    reports: Mutex<HashMap<String, Vec<Report>>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn reports(&self) -> MutexGuard<'_, HashMap<String, Vec<Report>>> {
        // Entries are only ever pushed whole, so a poisoned map is still consistent.
        self.reports.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReportStore for MemoryReportStore {
    fn save(&self, report: &Report) -> Result<String> {
        validate_subject_id(&report.subject_id)?;
        self.reports()
            .entry(report.subject_id.clone())
            .or_default()
            .push(report.clone());
        Ok(format!("memory://{}/{}", report.subject_id, report.report_id))
    }

    fn latest(&self, subject_id: &str) -> Result<Option<Report>> {
        Ok(self.list(subject_id)?.pop())
    }

    fn list(&self, subject_id: &str) -> Result<Vec<Report>> {
        validate_subject_id(subject_id)?;
        let mut reports = self.reports().get(subject_id).cloned().unwrap_or_default();
        reports.sort_by_key(|report| report.evaluated_at);
        Ok(reports)
    }
}
