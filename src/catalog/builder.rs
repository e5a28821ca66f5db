use super::types::{Catalog, Container, ContainerId, ContainerKind, Image, ImageId};
use super::CatalogError;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use tracing::{debug, warn};

/// A folder as stored by the library: a name plus the slash-delimited ids of
/// its ancestor chain
#[derive(Debug, Clone, PartialEq)]
pub struct FolderRecord {
    pub id: i64,
    pub name: String,
    pub folder_path: String,
}

/// A container as handed over by the catalog reader, before its members and
/// folder reference are resolved
#[derive(Debug, Clone)]
pub struct ContainerRecord {
    pub name: String,
    pub kind: ContainerKind,
    /// Id of the folder record this container lives in
    pub folder: Option<i64>,
    pub date: Option<NaiveDateTime>,
    /// Image keys, in source order
    pub members: Vec<String>,
}

impl ContainerRecord {
    pub fn new(name: impl Into<String>, kind: ContainerKind) -> Self {
        Self {
            name: name.into(),
            kind,
            folder: None,
            date: None,
            members: Vec::new(),
        }
    }

    pub fn in_folder(mut self, folder: i64) -> Self {
        self.folder = Some(folder);
        self
    }

    pub fn with_date(mut self, date: NaiveDateTime) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_members<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members = members.into_iter().map(Into::into).collect();
        self
    }
}

/// Assembles a [`Catalog`]. Folders must be added before the containers that
/// reference them.
#[derive(Debug)]
pub struct CatalogBuilder {
    images: Vec<Image>,
    by_key: HashMap<String, ImageId>,
    folders: HashMap<i64, FolderRecord>,
    containers: Vec<Container>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self {
            images: Vec::new(),
            by_key: HashMap::new(),
            folders: HashMap::new(),
            containers: vec![Container::new("", ContainerKind::Folder)],
        }
    }

    pub fn add_image(&mut self, image: Image) -> Result<ImageId, CatalogError> {
        if self.by_key.contains_key(&image.key) {
            return Err(CatalogError::DuplicateImage(image.key));
        }
        let id = ImageId(self.images.len());
        self.by_key.insert(image.key.clone(), id);
        self.images.push(image);
        Ok(id)
    }

    pub fn add_folder(&mut self, folder: FolderRecord) {
        self.folders.insert(folder.id, folder);
    }

    /// Add a container under the root. Members that are not in the image
    /// table are skipped and counted as hidden.
    pub fn add_container(&mut self, record: ContainerRecord) -> ContainerId {
        let mut container = Container::new(record.name, record.kind);
        container.date = record.date;
        container.folder_hint = record.folder.and_then(|id| self.resolve_folder_hint(id));

        for key in record.members.iter().filter(|k| !k.is_empty()) {
            match self.by_key.get(key) {
                Some(id) => container.images.push(*id),
                None => {
                    debug!(
                        "{}: image with id {} does not exist - could be hidden",
                        container.name, key
                    );
                    container.hidden_count += 1;
                }
            }
        }

        if container.hidden_count > 0 {
            warn!(
                "{}: {} images not exported (probably hidden)",
                container.name, container.hidden_count
            );
        }

        let id = ContainerId(self.containers.len());
        self.containers.push(container);
        self.containers[Catalog::ROOT.0].children.push(id);
        id
    }

    /// Map a folder's ancestor id chain to folder names. Ids without a folder
    /// record are dropped.
    fn resolve_folder_hint(&self, folder_id: i64) -> Option<String> {
        let folder = self.folders.get(&folder_id)?;

        let names: Vec<&str> = folder
            .folder_path
            .split('/')
            .filter_map(|segment| segment.trim().parse::<i64>().ok())
            .filter_map(|id| self.folders.get(&id))
            .map(|f| f.name.as_str())
            .filter(|name| !name.is_empty())
            .collect();

        if names.is_empty() {
            None
        } else {
            Some(names.join("/"))
        }
    }

    pub fn build(self) -> Catalog {
        Catalog {
            images: self.images,
            containers: self.containers,
        }
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}
