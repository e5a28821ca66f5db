use super::library::{ExportDirectory, ExportLibrary};
use super::PlanError;
use crate::catalog::{Catalog, Container, ContainerKind};
use crate::template::{sanitize_name, FolderNameContext, TemplateEngine};
use crate::utils::nfc;
use regex::{Regex, RegexBuilder};
use std::path::Path;
use tracing::{debug, info, warn};

/// Placeholder for containers without a usable name
pub const UNTITLED_CONTAINER: &str = "Untitled";

/// Compile an inclusion pattern: case-insensitive, anchored at the start of the name
pub fn compile_pattern(pattern: &str) -> Result<Regex, PlanError> {
    let regex = RegexBuilder::new(&format!("^(?:{})", pattern))
        .case_insensitive(true)
        .build()?;
    Ok(regex)
}

/// Which containers a planning pass includes, and where their folders go
#[derive(Debug, Clone)]
pub struct Selection {
    pub kinds: Vec<ContainerKind>,
    /// Matched against the container name. `None` matches everything.
    pub album_pattern: Option<Regex>,
    /// Matched against each folder hint segment. `None` matches everything.
    pub folder_pattern: Option<Regex>,
    /// Prepended verbatim to every folder of this pass
    pub prefix: String,
}

impl Selection {
    pub fn new(kinds: impl IntoIterator<Item = ContainerKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            album_pattern: None,
            folder_pattern: None,
            prefix: String::new(),
        }
    }

    /// Regular and published albums, plus events
    pub fn albums() -> Self {
        Self::new([ContainerKind::Regular, ContainerKind::Published, ContainerKind::Event])
    }

    /// Smart albums and the library's special rolls
    pub fn smart_albums() -> Self {
        Self::new([
            ContainerKind::Smart,
            ContainerKind::SpecialRoll,
            ContainerKind::SpecialMonth,
            ContainerKind::Flagged,
        ])
    }

    pub fn faces() -> Self {
        Self::new([ContainerKind::Face])
    }

    pub fn with_album_pattern(mut self, pattern: &str) -> Result<Self, PlanError> {
        self.album_pattern = Some(compile_pattern(pattern)?);
        Ok(self)
    }

    pub fn with_folder_pattern(mut self, pattern: &str) -> Result<Self, PlanError> {
        self.folder_pattern = Some(compile_pattern(pattern)?);
        Ok(self)
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn matches_kind(&self, container: &Container) -> bool {
        self.kinds.contains(&container.kind)
    }

    fn matches_name(&self, name: &str) -> bool {
        self.album_pattern.as_ref().map_or(true, |p| p.is_match(name))
    }

    /// Without a folder hint the folder filter is satisfied
    fn matches_folder(&self, container: &Container) -> bool {
        let segments = container.folder_segments();
        if segments.is_empty() {
            return true;
        }
        match &self.folder_pattern {
            Some(pattern) => segments.iter().any(|s| pattern.is_match(s)),
            None => true,
        }
    }
}

/// Builds [`ExportDirectory`] entries for catalog containers
pub struct ExportPlanner<'a> {
    catalog: &'a Catalog,
    templates: &'a TemplateEngine,
    originals: bool,
}

impl<'a> ExportPlanner<'a> {
    pub fn new(catalog: &'a Catalog, templates: &'a TemplateEngine) -> Self {
        Self {
            catalog,
            templates,
            originals: false,
        }
    }

    /// Record `Originals/` targets for images that carry an original file
    pub fn with_originals(mut self, originals: bool) -> Self {
        self.originals = originals;
        self
    }

    /// Plan every container the selection includes into `library`.
    /// Returns the number of directories in the library afterwards.
    pub fn plan_containers<'c, I>(&self, library: &mut ExportLibrary, containers: I, selection: &Selection) -> usize
    where
        I: IntoIterator<Item = &'c Container>,
    {
        for container in containers {
            if library.is_aborted() {
                info!("Export cancelled.");
                break;
            }
            self.plan_container(library, container, selection);
        }
        library.directory_count()
    }

    fn plan_container(&self, library: &mut ExportLibrary, container: &Container, selection: &Selection) {
        let name = if container.name.trim().is_empty() {
            warn!("Found a {} container with no name", container.kind);
            UNTITLED_CONTAINER.to_string()
        } else {
            container.name.clone()
        };

        if !selection.matches_kind(container) {
            return;
        }

        if !selection.matches_name(&name) {
            debug!("Skipping \"{}\" because it does not match album pattern", name);
            return;
        }

        if !selection.matches_folder(container) {
            debug!(
                "Skipping \"{}\" because its folders {:?} do not match folder pattern",
                name, container.folder_hint
            );
            return;
        }

        debug!("Loading \"{}\" (parent folders: {:?})", name, container.folder_hint);

        let relative_path = library
            .context()
            .find_unused_folder(&nfc(&self.folder_path(container, &name, &selection.prefix)));

        let mut directory = ExportDirectory::new(library.root(), relative_path, name);
        let images = container
            .images
            .iter()
            .filter_map(|id| self.catalog.image(*id).map(|image| (*id, image)));

        if directory.add_images(images, self.templates, self.originals) > 0 {
            library.insert(directory);
        } else {
            debug!("Skipping \"{}\" because it has no images", directory.container_name);
        }
    }

    /// Prefix, sanitized folder hint segments, then the templated container name
    fn folder_path(&self, container: &Container, name: &str, prefix: &str) -> String {
        let mut path = prefix.to_string();
        for segment in container.folder_segments() {
            let segment = sanitize_name(segment);
            if !segment.is_empty() {
                path.push_str(&segment);
                path.push('/');
            }
        }

        let folder_name = self
            .templates
            .folder_name(&FolderNameContext::new(container, name));
        if folder_name.is_empty() {
            path.push_str(UNTITLED_CONTAINER);
        } else {
            path.push_str(&folder_name);
        }
        path
    }
}

/// Plan one selection of containers into a new library rooted at `export_root`
pub fn plan<'c, I>(
    catalog: &Catalog,
    containers: I,
    selection: &Selection,
    templates: &TemplateEngine,
    export_root: &Path,
) -> ExportLibrary
where
    I: IntoIterator<Item = &'c Container>,
{
    let mut library = ExportLibrary::new(export_root);
    ExportPlanner::new(catalog, templates).plan_containers(&mut library, containers, selection);
    library
}
