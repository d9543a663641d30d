use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::{validate_subject_id, ReportStore, Result};
use crate::report::Report;

/// Filesystem-backed report store.
///
/// Layout: `<root>/<subject_id>/<report_id>.json`
pub struct FsReportStore {
    root: PathBuf,
}

impl FsReportStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn subject_dir(&self, subject_id: &str) -> Result<PathBuf> {
        validate_subject_id(subject_id)?;
        Ok(self.root.join(subject_id))
    }
}

impl ReportStore for FsReportStore {
    fn save(&self, report: &Report) -> Result<String> {
        let dir = self.subject_dir(&report.subject_id)?;
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.json", report.report_id));

        // Write to a temp file in the same directory, then rename.
        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, report)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&path).map_err(|e| e.error)?;

        Ok(path.display().to_string())
    }

    fn latest(&self, subject_id: &str) -> Result<Option<Report>> {
        Ok(self.list(subject_id)?.pop())
    }

    fn list(&self, subject_id: &str) -> Result<Vec<Report>> {
        let dir = self.subject_dir(subject_id)?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut reports = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let raw = fs::read(&path)?;
            reports.push(serde_json::from_slice::<Report>(&raw)?);
        }
        reports.sort_by_key(|report| report.evaluated_at);
        Ok(reports)
    }
}
