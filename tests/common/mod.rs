#![allow(dead_code)]

use phoshare::{
    plan, Catalog, CatalogBuilder, ContainerKind, ContainerRecord, ExportLibrary, ExportOptions, Image,
    Selection, TemplateEngine,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Create a temporary directory for testing
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Write a source image into the fake library, with a fixed modification time
pub fn write_image(library: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = library.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Should create library folder");
    }
    std::fs::write(&path, contents).expect("Should write image");
    set_mtime(&path, SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000));
    path
}

pub fn set_mtime(path: &Path, time: SystemTime) {
    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(path)
        .expect("Should open file");
    file.set_modified(time).expect("Should set mtime");
}

/// Copy a file the way a previous export would have left it
pub fn copy_as_exported(source: &Path, target: &Path) {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).expect("Should create export folder");
    }
    std::fs::copy(source, target).expect("Should copy file");
    let modified = std::fs::metadata(source)
        .and_then(|m| m.modified())
        .expect("Should read mtime");
    set_mtime(target, modified);
}

/// A catalog with one container holding `images` in order
pub fn single_album_catalog(name: &str, kind: ContainerKind, images: Vec<Image>) -> Catalog {
    let mut builder = CatalogBuilder::new();
    let keys: Vec<String> = images.iter().map(|i| i.key.clone()).collect();
    for image in images {
        builder.add_image(image).expect("Should add image");
    }
    builder.add_container(ContainerRecord::new(name, kind).with_members(keys));
    builder.build()
}

/// Plan every album of `catalog` with the default templates
pub fn plan_albums(catalog: &Catalog, export_root: &Path) -> ExportLibrary {
    let templates = TemplateEngine::new("{{title}}", "{{name}}").expect("Should compile templates");
    plan(
        catalog,
        catalog.top_level(),
        &Selection::albums(),
        &templates,
        export_root,
    )
}

pub fn confirmed_options() -> ExportOptions {
    ExportOptions {
        delete: true,
        ..Default::default()
    }
}

/// Every entry below `root` with its size and modification time, in path order
pub fn snapshot(root: &Path) -> Vec<(PathBuf, u64, SystemTime)> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| {
            let metadata = entry.metadata().expect("Should read metadata");
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path()).to_path_buf();
            let len = if metadata.is_dir() { 0 } else { metadata.len() };
            (relative, len, metadata.modified().expect("Should read mtime"))
        })
        .collect()
}
