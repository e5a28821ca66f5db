use crate::config::{ExportOptions, Quota};
use crate::utils::is_descendant;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, warn};
use walkdir::WalkDir;

/// Why an entry is being deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteReason {
    ObsoleteFile,
    ObsoleteDirectory,
    ObsoleteOriginal,
    ObsoleteOriginalsDirectory,
    /// Loose entry outside any planned directory
    Unmanaged,
    /// Non-directory sitting where a planned directory must go
    BlocksDirectory,
}

impl fmt::Display for DeleteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DeleteReason::ObsoleteFile => "Obsolete exported file",
            DeleteReason::ObsoleteDirectory => "Obsolete export directory",
            DeleteReason::ObsoleteOriginal => "Obsolete Original",
            DeleteReason::ObsoleteOriginalsDirectory => "Obsolete export Originals directory",
            DeleteReason::Unmanaged => "Obsolete",
            DeleteReason::BlocksDirectory => "Entry in the way of export directory",
        };
        f.write_str(text)
    }
}

/// Result of one deletion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Deleted, or would have been in a dry run
    Deleted,
    /// Not confirmed or over the deletion limit
    Skipped,
    /// Outside the export root; never performed
    Refused,
    Failed(String),
}

/// The only way the exporter removes anything. Every request is checked
/// against the export root before any filesystem call.
#[derive(Debug)]
pub struct DeletionGuard<'a> {
    export_root: &'a Path,
    options: &'a ExportOptions,
    quota: Quota,
    warned_unconfirmed: bool,
}

impl<'a> DeletionGuard<'a> {
    pub fn new(export_root: &'a Path, options: &'a ExportOptions) -> Self {
        Self {
            export_root,
            options,
            quota: Quota::new(options.limits.max_delete),
            warned_unconfirmed: false,
        }
    }

    pub async fn delete(&mut self, path: &Path, reason: DeleteReason) -> DeleteOutcome {
        if !is_descendant(path, self.export_root) {
            error!(
                "Internal error - attempting to delete {} that is not in export directory {}",
                path.display(),
                self.export_root.display()
            );
            return DeleteOutcome::Refused;
        }

        info!("{}: {}", reason, path.display());

        if !self.options.delete {
            if !self.warned_unconfirmed {
                warn!("Obsolete entries are not deleted unless deletions are enabled (--delete)");
                self.warned_unconfirmed = true;
            }
            return DeleteOutcome::Skipped;
        }

        if !self.quota.take() {
            info!("Limit for deletions reached, not deleting {}", path.display());
            return DeleteOutcome::Skipped;
        }

        if self.options.dry_run {
            return DeleteOutcome::Deleted;
        }

        let metadata = match fs::symlink_metadata(path).await {
            Ok(m) => m,
            Err(e) => {
                error!("Could not delete {}: {}", path.display(), e);
                return DeleteOutcome::Failed(e.to_string());
            }
        };

        let result = if metadata.is_dir() {
            remove_tree(path.to_path_buf(), self.export_root.to_path_buf()).await
        } else {
            fs::remove_file(path).await.map_err(|e| e.to_string())
        };

        match result {
            Ok(()) => DeleteOutcome::Deleted,
            Err(e) => {
                error!("Could not delete {}: {}", path.display(), e);
                DeleteOutcome::Failed(e)
            }
        }
    }
}

/// Delete `path` if it lies below `export_root`. Returns true when the entry
/// was deleted (or would have been, in a dry run).
pub async fn delete_entry(path: &Path, export_root: &Path, reason: DeleteReason, options: &ExportOptions) -> bool {
    DeletionGuard::new(export_root, options).delete(path, reason).await == DeleteOutcome::Deleted
}

/// Remove a directory depth-first. A child that cannot be removed does not
/// stop its siblings; the first error is returned once everything was tried.
async fn remove_tree(directory: PathBuf, export_root: PathBuf) -> Result<(), String> {
    tokio::task::spawn_blocking(move || {
        let mut first_error: Option<String> = None;

        for entry in WalkDir::new(&directory).contents_first(true).follow_links(false) {
            let result = match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if !is_descendant(path, &export_root) {
                        Err(format!("{} is outside the export directory", path.display()))
                    } else if entry.file_type().is_dir() {
                        std::fs::remove_dir(path).map_err(|e| format!("{}: {}", path.display(), e))
                    } else {
                        std::fs::remove_file(path).map_err(|e| format!("{}: {}", path.display(), e))
                    }
                }
                Err(e) => Err(e.to_string()),
            };

            if let Err(e) = result {
                error!("Could not delete {}", e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    })
    .await
    .map_err(|e| e.to_string())?
}
