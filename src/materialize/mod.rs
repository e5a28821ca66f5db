//! File materialization: decides whether an exported file is stale and
//! copies or links the library file into place.

mod staleness;
mod transfer;

pub use staleness::{check_need_to_export, StaleReason};
pub use transfer::{copy_file, link_file};

use crate::config::{ExportOptions, Quota};
use crate::plan::ExportFile;
use crate::utils::{is_directory, resolve_alias};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, error, info};

#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Cannot resolve source {path}: {source}")]
    UnresolvedSource {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// What happened to one expected file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterializeOutcome {
    Created,
    Updated,
    Unchanged,
    /// Stale or missing, but left alone because of the update gate or a limit
    Skipped,
    Failed(String),
}

/// Materializes export files according to the run's options, tracking the
/// create/update limits across calls.
pub struct Materializer<'a> {
    options: &'a ExportOptions,
    creates: Quota,
    updates: Quota,
}

impl<'a> Materializer<'a> {
    pub fn new(options: &'a ExportOptions) -> Self {
        Self {
            options,
            creates: Quota::new(options.limits.max_create),
            updates: Quota::new(options.limits.max_update),
        }
    }

    /// Make sure the exported file exists and is current. I/O errors are
    /// reported as [`MaterializeOutcome::Failed`], never returned.
    pub async fn materialize(&mut self, file: &ExportFile) -> MaterializeOutcome {
        self.export_or_report(&file.source, &file.path, true).await
    }

    /// Export the unedited original into `Originals/`. Returns `None` when the
    /// file has no original to export.
    pub async fn materialize_original(&mut self, file: &ExportFile) -> Option<MaterializeOutcome> {
        if !self.options.originals || !file.exports_original() {
            return None;
        }
        let (source, target) = match (&file.original_source, &file.original_path) {
            (Some(source), Some(target)) => (source, target),
            _ => return None,
        };

        if let Some(folder) = target.parent() {
            if !is_directory(folder).await {
                info!("Creating folder {}", folder.display());
                if !self.options.dry_run {
                    if let Err(e) = fs::create_dir_all(folder).await {
                        error!("Failed to create {}: {}", folder.display(), e);
                        return Some(MaterializeOutcome::Failed(e.to_string()));
                    }
                }
            }
        }

        Some(self.export_or_report(source, target, false).await)
    }

    async fn export_or_report(&mut self, source: &Path, target: &Path, check_size: bool) -> MaterializeOutcome {
        match self.export(source, target, check_size).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    "Failed to export {} to {}: {}",
                    source.display(),
                    target.display(),
                    e
                );
                MaterializeOutcome::Failed(e.to_string())
            }
        }
    }

    async fn export(&mut self, source: &Path, target: &Path, check_size: bool) -> Result<MaterializeOutcome, MaterializeError> {
        let resolved = resolve_alias(source)
            .await
            .map_err(|e| MaterializeError::UnresolvedSource {
                path: source.to_path_buf(),
                source: e,
            })?;

        let reason = check_need_to_export(
            target,
            &resolved,
            self.options.link,
            &self.options.tolerances,
            check_size,
        )
        .await?;

        let Some(reason) = reason else {
            debug!("{} up to date", target.display());
            return Ok(MaterializeOutcome::Unchanged);
        };

        let exists = reason != StaleReason::Missing;
        if exists {
            info!("Changed: {}: {}", target.display(), reason);
            if !self.options.update {
                info!("Needs update: {} (updates are disabled)", target.display());
                return Ok(MaterializeOutcome::Skipped);
            }
            if !self.updates.take() {
                info!("Limit for updates reached, not updating {}", target.display());
                return Ok(MaterializeOutcome::Skipped);
            }
            info!("Updating: {}", target.display());
        } else {
            if !self.creates.take() {
                info!("Limit for new files reached, not creating {}", target.display());
                return Ok(MaterializeOutcome::Skipped);
            }
            info!("New file: {}", target.display());
        }

        if !self.options.dry_run {
            if self.options.link {
                link_file(&resolved, target).await?;
            } else {
                copy_file(&resolved, target).await?;
            }
        }

        Ok(if exists {
            MaterializeOutcome::Updated
        } else {
            MaterializeOutcome::Created
        })
    }
}
