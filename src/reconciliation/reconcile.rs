use super::delete::{DeleteOutcome, DeleteReason};
use super::execute::{ExportProgress, ExportRun, ProgressFn};
use crate::config::is_ignored;
use crate::materialize::MaterializeOutcome;
use crate::plan::ExportDirectory;
use crate::utils::{file_base_name, is_directory, nfc, ORIGINALS_FOLDER};
use std::collections::HashSet;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs;
use tracing::{debug, error, info};

/// Directory entry as seen by the reconciler; symlinks are never followed
struct Entry {
    /// NFC-composed file name
    name: String,
    /// Path as listed, used for deletion
    path: PathBuf,
    /// NFC-composed path, used for every comparison against the plan
    key: PathBuf,
    is_dir: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathState {
    Directory,
    /// A file or symlink sits where the directory belongs
    Occupied,
    Missing,
}

/// Entries of `directory`, ordered by name. `directory_key` is the planned
/// form of `directory` that entry keys are built on.
async fn list_entries(directory: &Path, directory_key: &Path) -> io::Result<Vec<Entry>> {
    let mut entries = Vec::new();
    let mut reader = fs::read_dir(directory).await?;
    while let Some(entry) = reader.next_entry().await? {
        let file_type = entry.file_type().await?;
        let name = nfc(&entry.file_name().to_string_lossy());
        entries.push(Entry {
            key: directory_key.join(&name),
            name,
            path: entry.path(),
            is_dir: file_type.is_dir(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

impl<'a> ExportRun<'a> {
    /// Make every planned directory exist and remove what no longer belongs
    /// in it, then sweep the export root for unplanned directories.
    pub(super) async fn reconcile_library(&mut self, progress: &mut ProgressFn<'_>) {
        let library = self.library;
        let root = library.root();

        if !self.options.dry_run && !is_directory(root).await {
            info!("Creating export folder {}", root.display());
            if let Err(e) = fs::create_dir_all(root).await {
                error!("Failed to create {}: {}", root.display(), e);
                self.report
                    .record_export(PathBuf::new(), MaterializeOutcome::Failed(e.to_string()));
                return;
            }
        }

        let managed = library.managed_paths();
        for directory in library.directories() {
            if library.is_aborted() {
                return;
            }
            self.reconcile_directory(directory, &managed).await;
            progress(ExportProgress::DirectoryReconciled(directory));
        }

        if library.is_aborted() {
            return;
        }
        self.sweep(root, root, &managed).await;
    }

    async fn delete(&mut self, path: &Path, reason: DeleteReason) -> bool {
        let outcome = self.guard.delete(path, reason).await;
        let deleted = outcome == DeleteOutcome::Deleted;
        let relative = self.relative(path);
        self.report.record_deletion(relative, outcome);
        deleted
    }

    async fn reconcile_directory(&mut self, directory: &ExportDirectory, managed: &HashSet<PathBuf>) {
        debug!("Scanning {}", directory.path.display());

        let state = match fs::symlink_metadata(&directory.path).await {
            Ok(metadata) if metadata.is_dir() => PathState::Directory,
            Ok(_) => PathState::Occupied,
            Err(e) if e.kind() == io::ErrorKind::NotFound => PathState::Missing,
            Err(e) => {
                error!("Cannot read {}: {}", directory.path.display(), e);
                return;
            }
        };

        if state == PathState::Occupied && !self.delete(&directory.path, DeleteReason::BlocksDirectory).await {
            error!("Cannot create {}: path is occupied", directory.path.display());
            return;
        }

        if state != PathState::Directory {
            info!("Creating folder {}", directory.path.display());
            let relative = self.relative(&directory.path);
            self.report.directories_created.push(relative);
            if !self.options.dry_run {
                if let Err(e) = fs::create_dir_all(&directory.path).await {
                    error!("Failed to create {}: {}", directory.path.display(), e);
                }
            }
            return;
        }

        let entries = match list_entries(&directory.path, &directory.path).await {
            Ok(entries) => entries,
            Err(e) => {
                error!("Cannot list {}: {}", directory.path.display(), e);
                return;
            }
        };

        for entry in entries {
            if is_ignored(&entry.name, &self.options.ignored_names) {
                continue;
            }

            if entry.is_dir {
                if self.options.originals && entry.name == ORIGINALS_FOLDER {
                    self.reconcile_originals(directory, &entry.path, &entry.key).await;
                } else if managed.iter().any(|path| path.starts_with(&entry.key)) {
                    debug!("Keeping {}, it holds another export folder", entry.path.display());
                    self.sweep(&entry.path, &entry.key, managed).await;
                } else {
                    self.delete(&entry.path, DeleteReason::ObsoleteDirectory).await;
                }
                continue;
            }

            let base_name = file_base_name(&entry.key);
            let expected = directory
                .file(&base_name)
                .is_some_and(|file| file.is_part_of(&entry.key));
            if !expected {
                self.delete(&entry.path, DeleteReason::ObsoleteFile).await;
            }
        }
    }

    async fn reconcile_originals(&mut self, directory: &ExportDirectory, folder: &Path, folder_key: &Path) {
        let entries = match list_entries(folder, folder_key).await {
            Ok(entries) => entries,
            Err(e) => {
                error!("Cannot list {}: {}", folder.display(), e);
                return;
            }
        };

        for entry in entries {
            if is_ignored(&entry.name, &self.options.ignored_names) {
                continue;
            }

            if entry.is_dir {
                self.delete(&entry.path, DeleteReason::ObsoleteOriginalsDirectory).await;
                continue;
            }

            let base_name = file_base_name(&entry.key);
            let expected = directory.file(&base_name).is_some_and(|file| {
                file.exports_original() && file.original_path.as_deref() == Some(entry.key.as_path())
            });
            if !expected {
                self.delete(&entry.path, DeleteReason::ObsoleteOriginal).await;
            }
        }
    }

    /// Delete unplanned entries below `directory`. Returns true when the
    /// directory holds a planned directory somewhere below it, or could not
    /// be fully examined, and so must be kept.
    fn sweep<'s>(
        &'s mut self,
        directory: &'s Path,
        directory_key: &'s Path,
        managed: &'s HashSet<PathBuf>,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 's>> {
        Box::pin(async move {
            let entries = match list_entries(directory, directory_key).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return true,
                Err(e) => {
                    error!("Cannot list {}: {}", directory.display(), e);
                    return true;
                }
            };

            let mut keep = false;
            for entry in entries {
                if self.library.is_aborted() {
                    return true;
                }
                if is_ignored(&entry.name, &self.options.ignored_names) {
                    continue;
                }

                if managed.contains(&entry.key) {
                    keep = true;
                } else if !entry.is_dir {
                    self.delete(&entry.path, DeleteReason::Unmanaged).await;
                } else if self.sweep(&entry.path, &entry.key, managed).await {
                    keep = true;
                } else {
                    self.delete(&entry.path, DeleteReason::ObsoleteDirectory).await;
                }
            }
            keep
        })
    }
}
