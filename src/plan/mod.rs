//! Export planning.
//!
//! Walks catalog containers, applies the inclusion filters and assigns
//! deterministic, collision-free folder and file names. Planning never
//! touches the filesystem.

mod library;
mod planner;

pub use library::{ExportDirectory, ExportFile, ExportLibrary, PlanContext};
pub use planner::{compile_pattern, plan, ExportPlanner, Selection, UNTITLED_CONTAINER};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
