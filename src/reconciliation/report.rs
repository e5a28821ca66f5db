use super::delete::DeleteOutcome;
use crate::materialize::MaterializeOutcome;
use std::fmt;
use std::path::PathBuf;

/// A file that could not be exported or deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedEntry {
    pub path: PathBuf,
    pub error: String,
}

/// Result of an export run. Paths are relative to the export root, so a dry
/// run and a real run over the same state produce equal reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub directories_created: Vec<PathBuf>,
    pub created: Vec<PathBuf>,
    pub updated: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    /// Stale or missing files left alone by the update gate or a limit
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<FailedEntry>,
    pub deleted: Vec<PathBuf>,
    /// Obsolete entries kept because deletion was not confirmed or limited
    pub deletions_skipped: Vec<PathBuf>,
    /// Deletion requests outside the export root
    pub deletions_refused: Vec<PathBuf>,
    pub cancelled: bool,
}

impl ExportReport {
    pub fn record_export(&mut self, path: PathBuf, outcome: MaterializeOutcome) {
        match outcome {
            MaterializeOutcome::Created => self.created.push(path),
            MaterializeOutcome::Updated => self.updated.push(path),
            MaterializeOutcome::Unchanged => self.unchanged.push(path),
            MaterializeOutcome::Skipped => self.skipped.push(path),
            MaterializeOutcome::Failed(error) => self.failed.push(FailedEntry { path, error }),
        }
    }

    pub fn record_deletion(&mut self, path: PathBuf, outcome: DeleteOutcome) {
        match outcome {
            DeleteOutcome::Deleted => self.deleted.push(path),
            DeleteOutcome::Skipped => self.deletions_skipped.push(path),
            DeleteOutcome::Refused => self.deletions_refused.push(path),
            DeleteOutcome::Failed(error) => self.failed.push(FailedEntry { path, error }),
        }
    }

    /// Whether the run changed (or in a dry run, would change) the export tree
    pub fn has_changes(&self) -> bool {
        !self.directories_created.is_empty()
            || !self.created.is_empty()
            || !self.updated.is_empty()
            || !self.deleted.is_empty()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.deletions_refused.is_empty() && !self.cancelled
    }
}

impl fmt::Display for ExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Directories created: {}", self.directories_created.len())?;
        writeln!(
            f,
            "Files created: {}, updated: {}, unchanged: {}, skipped: {}, failed: {}",
            self.created.len(),
            self.updated.len(),
            self.unchanged.len(),
            self.skipped.len(),
            self.failed.len()
        )?;
        write!(
            f,
            "Deleted: {}, not deleted: {}, refused: {}",
            self.deleted.len(),
            self.deletions_skipped.len(),
            self.deletions_refused.len()
        )?;
        if self.cancelled {
            write!(f, "\nExport was cancelled before completion")?;
        }
        for failure in &self.failed {
            write!(f, "\n  {}: {}", failure.path.display(), failure.error)?;
        }
        Ok(())
    }
}
