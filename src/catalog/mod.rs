//! In-memory catalog model.
//!
//! The catalog is read once per run and is read-only afterwards. Images live
//! in a single indexed table and containers reference them by [`ImageId`], so
//! one image can belong to any number of events and albums.

mod builder;
mod reader;
mod types;

pub use builder::{CatalogBuilder, ContainerRecord, FolderRecord};
pub use reader::{parse_catalog, read_catalog};
pub use types::{Catalog, Container, ContainerId, ContainerKind, Image, ImageId};
pub(crate) use types::date_parts;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid catalog record: {0}")]
    InvalidRecord(String),

    #[error("Duplicate image id: {0}")]
    DuplicateImage(String),

    #[error("Unknown container type: {0}")]
    UnknownKind(String),
}
