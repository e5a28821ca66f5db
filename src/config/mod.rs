mod options;

pub use options::{ExportOptions, Quota};

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Entries the exporter never classifies or deletes (compared case-insensitively)
pub const DEFAULT_IGNORED_NAMES: &[&str] = &[
    ".DS_Store",
    "Thumbs.db",
    "desktop.ini",
    ".localized",
    "Icon\r",
    ".picasa.ini",
    "pspbrwse.jbf",
];

fn default_mtime_fudge_secs() -> u64 {
    3
}

fn default_max_size_diff() -> u64 {
    60_000
}

fn default_link_size_diff() -> u64 {
    32
}

/// Heuristics used to decide whether an exported file is stale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tolerances {
    /// Seconds a target may be older than its source and still count as current
    #[serde(default = "default_mtime_fudge_secs")]
    pub mtime_fudge_secs: u64,
    /// Size difference allowed for metadata edits made in the exported copy
    #[serde(default = "default_max_size_diff")]
    pub max_size_diff: u64,
    /// Size difference allowed in link mode, where both names share one file
    #[serde(default = "default_link_size_diff")]
    pub link_size_diff: u64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            mtime_fudge_secs: default_mtime_fudge_secs(),
            max_size_diff: default_max_size_diff(),
            link_size_diff: default_link_size_diff(),
        }
    }
}

/// Per-run caps on mutations. `None` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    pub max_create: Option<usize>,
    pub max_update: Option<usize>,
    pub max_delete: Option<usize>,
}

fn default_name_template() -> String {
    "{{title}}".to_string()
}

fn default_folder_template() -> String {
    "{{name}}".to_string()
}

fn default_caption_template() -> String {
    "{{caption}}".to_string()
}

fn default_ignored_names() -> Vec<String> {
    DEFAULT_IGNORED_NAMES.iter().map(|s| s.to_string()).collect()
}

/// Exporter configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    /// Template for image file base names
    #[serde(default = "default_name_template")]
    pub name_template: String,
    /// Template for album folder names
    #[serde(default = "default_folder_template")]
    pub folder_template: String,
    /// Template for image captions; only consumed by external metadata tooling
    #[serde(default = "default_caption_template")]
    pub caption_template: String,
    /// Prefix prepended to face album folders
    #[serde(default)]
    pub face_album_prefix: String,
    #[serde(default)]
    pub tolerances: Tolerances,
    #[serde(default = "default_ignored_names")]
    pub ignored_names: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            name_template: default_name_template(),
            folder_template: default_folder_template(),
            caption_template: default_caption_template(),
            face_album_prefix: String::new(),
            tolerances: Tolerances::default(),
            ignored_names: default_ignored_names(),
        }
    }
}

/// Read a configuration file. Returns `None` when the file does not exist.
pub async fn read_config(config_path: &Path) -> Result<Option<ExportConfig>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(config_path).await?;
    let config: ExportConfig = serde_json::from_str(&content)?;
    Ok(Some(config))
}

/// Check a directory entry name against an ignore list
pub fn is_ignored(name: &str, ignored_names: &[String]) -> bool {
    ignored_names.iter().any(|n| n.eq_ignore_ascii_case(name))
}
