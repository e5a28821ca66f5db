pub mod catalog;
pub mod config;
pub mod materialize;
pub mod plan;
pub mod reconciliation;
pub mod template;
pub mod utils;

// Re-export commonly used types
pub use catalog::{
    read_catalog, Catalog, CatalogBuilder, CatalogError, Container, ContainerKind, ContainerRecord,
    FolderRecord, Image, ImageId,
};
pub use config::{read_config, ConfigError, ExportConfig, ExportOptions, Limits, Tolerances};
pub use materialize::{MaterializeError, MaterializeOutcome, Materializer, StaleReason};
pub use plan::{plan, ExportDirectory, ExportFile, ExportLibrary, ExportPlanner, PlanError, Selection};
pub use reconciliation::{
    delete_entry, run_export, run_export_with_progress, DeleteReason, DeletionGuard, ExportProgress,
    ExportReport,
};
pub use template::{TemplateEngine, TemplateError};
