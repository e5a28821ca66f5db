use super::builder::{CatalogBuilder, ContainerRecord, FolderRecord};
use super::types::{Catalog, ContainerKind, Image};
use super::CatalogError;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// JSON catalog export, as written by the library dump tool
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogFile {
    #[serde(default)]
    images: Vec<ImageEntry>,
    #[serde(default)]
    folders: Vec<FolderEntry>,
    #[serde(default)]
    albums: Vec<AlbumEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageEntry {
    id: String,
    path: PathBuf,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    date: Option<NaiveDateTime>,
    #[serde(default)]
    original_path: Option<PathBuf>,
    #[serde(default)]
    rotation_is_only_edit: bool,
    #[serde(default)]
    faces: Vec<String>,
    #[serde(default)]
    hidden: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FolderEntry {
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    folder_path: String,
}

fn default_album_type() -> String {
    ContainerKind::Regular.as_str().to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlbumEntry {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default = "default_album_type")]
    album_type: String,
    #[serde(default)]
    folder: Option<i64>,
    #[serde(default)]
    date: Option<NaiveDateTime>,
    #[serde(default)]
    images: Vec<String>,
}

/// Read a JSON catalog file. Relative image paths are resolved against the
/// directory holding the catalog file.
pub async fn read_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let content = fs::read_to_string(path).await?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_catalog(&content, base_dir)
}

/// Parse catalog JSON into a [`Catalog`]
pub fn parse_catalog(content: &str, base_dir: &Path) -> Result<Catalog, CatalogError> {
    let file: CatalogFile = serde_json::from_str(content)?;
    let mut builder = CatalogBuilder::new();

    for entry in file.images {
        if entry.hidden {
            debug!("Skipping hidden image {}", entry.id);
            continue;
        }

        let path = if entry.path.is_relative() {
            base_dir.join(&entry.path)
        } else {
            entry.path
        };

        let mut image = Image::new(entry.id, path)?.with_faces(entry.faces);
        if let Some(caption) = entry.caption {
            image = image.with_caption(caption);
        }
        if let Some(date) = entry.date {
            image = image.with_date(date);
        }
        if let Some(original) = entry.original_path {
            let original = if original.is_relative() {
                base_dir.join(original)
            } else {
                original
            };
            image = image.with_original(original, entry.rotation_is_only_edit);
        }

        builder.add_image(image)?;
    }

    for folder in file.folders {
        builder.add_folder(FolderRecord {
            id: folder.id,
            name: folder.name,
            folder_path: folder.folder_path,
        });
    }

    for album in file.albums {
        let kind = match album.album_type.parse::<ContainerKind>() {
            Ok(kind) => kind,
            Err(e) => {
                warn!("Skipping album \"{}\": {}", album.name, e);
                continue;
            }
        };

        let mut record = ContainerRecord::new(album.name, kind).with_members(album.images);
        record.folder = album.folder;
        record.date = album.date;
        builder.add_container(record);
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "images": [
            {"id": "1", "path": "Masters/a.jpg", "caption": "Sunset", "date": "2020-01-01T10:00:00"},
            {"id": "2", "path": "/abs/b.jpg", "hidden": true},
            {"id": "3", "path": "/abs/c.jpg", "originalPath": "/abs/orig/c.jpg", "rotationIsOnlyEdit": true, "faces": ["Al"]}
        ],
        "folders": [
            {"id": 1, "name": "", "folderPath": "1/"},
            {"id": 7, "name": "Trips", "folderPath": "1/7/"}
        ],
        "albums": [
            {"name": "2020-01-01", "type": "Event", "images": ["1", "2", "3"]},
            {"name": "Beach", "folder": 7, "images": ["3"]},
            {"name": "Slides", "type": "Slideshow", "images": ["1"]}
        ]
    }"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = parse_catalog(SAMPLE, Path::new("/library")).unwrap();

        assert_eq!(catalog.images().len(), 2);
        assert_eq!(catalog.images()[0].path, PathBuf::from("/library/Masters/a.jpg"));
        assert_eq!(catalog.images()[0].caption(), "Sunset");
        assert!(catalog.images()[1].rotation_is_only_edit);

        let top = catalog.top_level();
        assert_eq!(top.len(), 2);

        assert_eq!(top[0].kind, ContainerKind::Event);
        assert_eq!(top[0].images.len(), 2);
        assert_eq!(top[0].hidden_count, 1);

        assert_eq!(top[1].kind, ContainerKind::Regular);
        assert_eq!(top[1].folder_hint.as_deref(), Some("Trips"));
    }

    #[test]
    fn test_parse_catalog_requires_image_path() {
        let result = parse_catalog(r#"{"images": [{"id": "1"}]}"#, Path::new("/"));
        assert!(matches!(result, Err(CatalogError::JsonError(_))));
    }

    #[test]
    fn test_parse_catalog_rejects_empty_id() {
        let result = parse_catalog(r#"{"images": [{"id": "", "path": "/a.jpg"}]}"#, Path::new("/"));
        assert!(matches!(result, Err(CatalogError::InvalidRecord(_))));
    }

    #[tokio::test]
    async fn test_read_catalog_from_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("catalog.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let catalog = read_catalog(&path).await.unwrap();
        assert_eq!(catalog.images()[0].path, temp.path().join("Masters/a.jpg"));
    }
}
