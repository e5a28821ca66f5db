//! Export reconciliation: brings the export tree in line with a planned
//! [`ExportLibrary`](crate::plan::ExportLibrary).
//!
//! A run has two phases. Every planned directory is reconciled first
//! (created if missing, obsolete entries deleted) and the export root is
//! swept for directories that are no longer planned. Only then are the
//! expected files materialized. All deletions go through [`DeletionGuard`].

mod delete;
mod execute;
mod reconcile;
mod report;

pub use delete::{delete_entry, DeleteOutcome, DeleteReason, DeletionGuard};
pub use execute::{run_export, run_export_with_progress, ExportProgress, ExportRun, ProgressFn};
pub use report::{ExportReport, FailedEntry};
