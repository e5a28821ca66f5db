use super::sanitize::strip_media_extension;
use crate::catalog::{date_parts, Container, Image};
use serde::Serialize;

/// Context for image name templates
/// Placeholders: {{title}}, {{caption}}, {{index}}, {{index0}}, {{album}}, {{id}}, {{filename}}, {{yyyy}}, {{mm}}, {{dd}}, {{date}}
#[derive(Debug, Clone, Serialize)]
pub struct ImageNameContext {
    pub title: String,
    pub caption: String,
    pub index: usize,
    pub index0: String,
    pub album: String,
    pub id: String,
    pub filename: String,
    pub yyyy: String,
    pub mm: String,
    pub dd: String,
    pub date: String,
}

impl ImageNameContext {
    pub fn new(image: &Image, album: &str, index: usize, index0: String) -> Self {
        let caption = image.caption();
        let (yyyy, mm, dd) = date_parts(image.date);
        let date = if yyyy.is_empty() {
            String::new()
        } else {
            format!("{}-{}-{}", yyyy, mm, dd)
        };

        Self {
            title: strip_media_extension(&caption),
            caption,
            index,
            index0,
            album: album.to_string(),
            id: image.key.clone(),
            filename: crate::utils::file_base_name(&image.path),
            yyyy,
            mm,
            dd,
            date,
        }
    }
}

/// Context for folder name templates
/// Placeholders: {{name}}, {{kind}}, {{yyyy}}, {{mm}}, {{dd}}, {{date}}
#[derive(Debug, Clone, Serialize)]
pub struct FolderNameContext {
    pub name: String,
    pub kind: String,
    pub yyyy: String,
    pub mm: String,
    pub dd: String,
    pub date: String,
}

impl FolderNameContext {
    pub fn new(container: &Container, name: &str) -> Self {
        let (yyyy, mm, dd) = date_parts(container.date);
        let date = if yyyy.is_empty() {
            String::new()
        } else {
            format!("{}-{}-{}", yyyy, mm, dd)
        };

        Self {
            name: name.to_string(),
            kind: container.kind.to_string(),
            yyyy,
            mm,
            dd,
            date,
        }
    }
}
