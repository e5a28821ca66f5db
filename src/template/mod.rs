mod engine;
mod sanitize;
mod types;

pub use engine::{TemplateEngine, TemplateError};
pub use sanitize::{padded_index, sanitize_name, strip_media_extension};
pub use types::{FolderNameContext, ImageNameContext};
