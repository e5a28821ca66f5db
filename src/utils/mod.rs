mod fs;

pub use fs::{inode, is_descendant, is_directory, modified_secs, resolve_alias, resolve_export_root};

use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Name of the folder that holds original (unedited) files inside an export directory
pub const ORIGINALS_FOLDER: &str = "Originals";

/// Get a file's base name (file name without its last extension)
pub fn file_base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Get a file's extension without the leading dot, if it has one
pub fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_string())
        .filter(|e| !e.is_empty())
}

/// Join a base name and an optional extension into a file name
pub fn file_name_with_extension(base_name: &str, extension: Option<&str>) -> String {
    match extension {
        Some(ext) => format!("{}.{}", base_name, ext),
        None => base_name.to_string(),
    }
}

/// Compose a name to NFC. Planned names are kept in this form and listed
/// names are converted before any comparison, since some filesystems hand
/// back decomposed (NFD) names.
pub fn nfc(name: &str) -> String {
    name.nfc().collect()
}

/// Express `path` relative to `root`. Paths outside `root` are returned unchanged.
pub fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}
