use super::delete::DeletionGuard;
use super::report::ExportReport;
use crate::config::ExportOptions;
use crate::materialize::{MaterializeOutcome, Materializer};
use crate::plan::{ExportDirectory, ExportLibrary};
use crate::utils::{is_directory, relative_to};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info};

/// Emitted after each unit of work, in run order
#[derive(Debug, Clone, Copy)]
pub enum ExportProgress<'a> {
    DirectoryReconciled(&'a ExportDirectory),
    DirectoryMaterialized(&'a ExportDirectory),
}

/// Callback receiving [`ExportProgress`] events
pub type ProgressFn<'p> = dyn FnMut(ExportProgress<'_>) + Send + 'p;

/// State of one export run over a planned library
pub struct ExportRun<'a> {
    pub(super) library: &'a ExportLibrary,
    pub(super) options: &'a ExportOptions,
    pub(super) guard: DeletionGuard<'a>,
    materializer: Materializer<'a>,
    pub(super) report: ExportReport,
}

impl<'a> ExportRun<'a> {
    pub fn new(library: &'a ExportLibrary, options: &'a ExportOptions) -> Self {
        Self {
            library,
            options,
            guard: DeletionGuard::new(library.root(), options),
            materializer: Materializer::new(options),
            report: ExportReport::default(),
        }
    }

    /// Reconcile the whole tree first, then materialize every directory.
    pub async fn run(mut self, progress: &mut ProgressFn<'_>) -> ExportReport {
        self.reconcile_library(progress).await;
        if !self.library.is_aborted() {
            self.materialize_library(progress).await;
        }

        self.report.cancelled = self.library.is_aborted();
        if self.report.cancelled {
            info!("Export cancelled");
        }
        self.report
    }

    pub(super) fn relative(&self, path: &Path) -> PathBuf {
        relative_to(self.library.root(), path)
    }

    async fn materialize_library(&mut self, progress: &mut ProgressFn<'_>) {
        let library = self.library;
        for directory in library.directories() {
            if library.is_aborted() {
                return;
            }
            self.materialize_directory(directory).await;
            progress(ExportProgress::DirectoryMaterialized(directory));
        }
    }

    async fn materialize_directory(&mut self, directory: &ExportDirectory) {
        if !self.options.dry_run && !is_directory(&directory.path).await {
            if let Err(e) = fs::create_dir_all(&directory.path).await {
                error!("Failed to create {}: {}", directory.path.display(), e);
                for file in directory.files() {
                    let path = self.relative(&file.path);
                    self.report
                        .record_export(path, MaterializeOutcome::Failed(e.to_string()));
                }
                return;
            }
        }

        for file in directory.files() {
            let outcome = self.materializer.materialize(file).await;
            let path = self.relative(&file.path);
            self.report.record_export(path, outcome);

            if let Some(outcome) = self.materializer.materialize_original(file).await {
                if let Some(original) = &file.original_path {
                    let path = self.relative(original);
                    self.report.record_export(path, outcome);
                }
            }
        }
    }
}

/// Bring the export tree in line with the planned library.
pub async fn run_export(library: &ExportLibrary, options: &ExportOptions) -> ExportReport {
    run_export_with_progress(library, options, |_| {}).await
}

/// Like [`run_export`], calling `progress` after each directory is reconciled
/// and after each is materialized. Cancelling the library's token from the
/// callback stops the run before the next directory.
pub async fn run_export_with_progress<F>(library: &ExportLibrary, options: &ExportOptions, mut progress: F) -> ExportReport
where
    F: FnMut(ExportProgress<'_>) + Send,
{
    info!(
        "Exporting {} directories ({} files) to {}",
        library.directory_count(),
        library.file_count(),
        library.root().display()
    );
    ExportRun::new(library, options).run(&mut progress).await
}
