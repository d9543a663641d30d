//! Report persistence.
//!
//! Reports are grouped by subject. Writers never observe partial files and
//! reading a subject with no reports is not an error.

pub mod fs;
pub mod memory;

use thiserror::Error;

use crate::report::Report;

pub use fs::FsReportStore;
pub use memory::MemoryReportStore;

/// Errors from report store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid subject id: {0:?}")]
    InvalidSubjectId(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage for finished reports.
pub trait ReportStore: Send + Sync {
    /// Persist `report` and return where it was written.
    fn save(&self, report: &Report) -> Result<String>;

    /// Most recently evaluated report for `subject_id`, if any.
    fn latest(&self, subject_id: &str) -> Result<Option<Report>>;

    /// All reports for `subject_id`, oldest first.
    fn list(&self, subject_id: &str) -> Result<Vec<Report>>;
}

/// Reject ids that are empty or could escape a store directory.
pub fn validate_subject_id(subject_id: &str) -> Result<()> {
    let ok = !subject_id.is_empty()
        && subject_id.len() <= 128
        && subject_id != "."
        && subject_id != ".."
        && subject_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidSubjectId(subject_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_id_rules() {
        assert!(validate_subject_id("startup-42").is_ok());
        assert!(validate_subject_id("acme_robotics.v2").is_ok());

        for bad in ["", ".", "..", "../etc", "a/b", "a\\b", "with space"] {
            assert!(
                matches!(validate_subject_id(bad), Err(StoreError::InvalidSubjectId(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
