use super::CatalogError;
use chrono::{NaiveDateTime, Datelike};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Index of an image in the catalog's image table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub usize);

/// Index of a container in the catalog's container table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub usize);

/// Type tag of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Regular,
    Smart,
    Event,
    Folder,
    Face,
    Published,
    Flagged,
    SpecialRoll,
    SpecialMonth,
}

impl ContainerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerKind::Regular => "Regular",
            ContainerKind::Smart => "Smart",
            ContainerKind::Event => "Event",
            ContainerKind::Folder => "Folder",
            ContainerKind::Face => "Face",
            ContainerKind::Published => "Published",
            ContainerKind::Flagged => "Flagged",
            ContainerKind::SpecialRoll => "Special Roll",
            ContainerKind::SpecialMonth => "Special Month",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "regular" => Ok(ContainerKind::Regular),
            "smart" => Ok(ContainerKind::Smart),
            "event" => Ok(ContainerKind::Event),
            "folder" => Ok(ContainerKind::Folder),
            "face" => Ok(ContainerKind::Face),
            "published" => Ok(ContainerKind::Published),
            "flagged" => Ok(ContainerKind::Flagged),
            "specialroll" => Ok(ContainerKind::SpecialRoll),
            "specialmonth" => Ok(ContainerKind::SpecialMonth),
            _ => Err(CatalogError::UnknownKind(s.to_string())),
        }
    }
}

/// One source media item
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Stable identity from the catalog
    pub key: String,
    /// Source file path
    pub path: PathBuf,
    caption: String,
    pub date: Option<NaiveDateTime>,
    /// Unedited original, when the library keeps one next to the edited version
    pub original_path: Option<PathBuf>,
    pub rotation_is_only_edit: bool,
    pub faces: Vec<String>,
}

impl Image {
    /// Create an image. Both the key and the source path are required.
    pub fn new(key: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let key = key.into();
        let path = path.into();

        if key.trim().is_empty() {
            return Err(CatalogError::InvalidRecord(format!(
                "image at {} has no id",
                path.display()
            )));
        }
        if path.as_os_str().is_empty() {
            return Err(CatalogError::InvalidRecord(format!("image {} has no path", key)));
        }

        Ok(Self {
            key,
            path,
            caption: String::new(),
            date: None,
            original_path: None,
            rotation_is_only_edit: false,
            faces: Vec::new(),
        })
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into().trim().to_string();
        self
    }

    pub fn with_date(mut self, date: NaiveDateTime) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_original(mut self, original_path: impl Into<PathBuf>, rotation_is_only_edit: bool) -> Self {
        self.original_path = Some(original_path.into());
        self.rotation_is_only_edit = rotation_is_only_edit;
        self
    }

    pub fn with_faces(mut self, faces: Vec<String>) -> Self {
        self.faces = faces;
        self
    }

    /// File name of the source image
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Display caption, falling back to the source file name when empty
    pub fn caption(&self) -> String {
        if self.caption.is_empty() {
            self.file_name()
        } else {
            self.caption.clone()
        }
    }
}

/// A node in the source hierarchy: event, album, folder or face grouping
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub name: String,
    pub kind: ContainerKind,
    /// Ancestor folder names, slash-delimited
    pub folder_hint: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub images: Vec<ImageId>,
    /// Members that were hidden or missing from the image table
    pub hidden_count: usize,
    pub children: Vec<ContainerId>,
}

impl Container {
    pub fn new(name: impl Into<String>, kind: ContainerKind) -> Self {
        Self {
            name: name.into(),
            kind,
            folder_hint: None,
            date: None,
            images: Vec::new(),
            hidden_count: 0,
            children: Vec::new(),
        }
    }

    /// Folder hint split into its non-empty segments
    pub fn folder_segments(&self) -> Vec<&str> {
        self.folder_hint
            .as_deref()
            .map(|hint| hint.split('/').filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// The catalog: an image table plus a container tree rooted at a synthetic root
#[derive(Debug, Clone)]
pub struct Catalog {
    pub(super) images: Vec<Image>,
    pub(super) containers: Vec<Container>,
}

impl Catalog {
    pub const ROOT: ContainerId = ContainerId(0);

    pub fn image(&self, id: ImageId) -> Option<&Image> {
        self.images.get(id.0)
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.0)
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// The root's direct children
    pub fn top_level(&self) -> Vec<&Container> {
        self.containers[Self::ROOT.0]
            .children
            .iter()
            .filter_map(|id| self.container(*id))
            .collect()
    }

    /// Synthesize one face container per distinct face name, sorted by name.
    pub fn face_containers(&self) -> Vec<Container> {
        let mut faces: BTreeMap<String, Container> = BTreeMap::new();

        for (index, image) in self.images.iter().enumerate() {
            for face in image.faces.iter().filter(|f| !f.trim().is_empty()) {
                let container = faces
                    .entry(face.clone())
                    .or_insert_with(|| Container::new(face.clone(), ContainerKind::Face));
                if !container.images.contains(&ImageId(index)) {
                    container.images.push(ImageId(index));
                }
                if let Some(date) = image.date {
                    if container.date.map_or(true, |d| date < d) {
                        container.date = Some(date);
                    }
                }
            }
        }

        faces.into_values().collect()
    }
}

/// Year, month and day of an optional date as zero-padded strings
pub(crate) fn date_parts(date: Option<NaiveDateTime>) -> (String, String, String) {
    match date {
        Some(d) => (
            format!("{:04}", d.year()),
            format!("{:02}", d.month()),
            format!("{:02}", d.day()),
        ),
        None => (String::new(), String::new(), String::new()),
    }
}
