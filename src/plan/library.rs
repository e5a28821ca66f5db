use crate::catalog::{Image, ImageId};
use crate::template::{padded_index, ImageNameContext, TemplateEngine};
use crate::utils::{file_extension, file_name_with_extension, nfc, ORIGINALS_FOLDER};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Binding of one image to one target path inside an [`ExportDirectory`]
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub image: ImageId,
    /// Source file as recorded in the catalog (aliases not yet resolved)
    pub source: PathBuf,
    pub base_name: String,
    /// Target path of the exported file
    pub path: PathBuf,
    pub original_source: Option<PathBuf>,
    /// Target path inside `Originals/`, when originals are exported
    pub original_path: Option<PathBuf>,
    pub rotation_is_only_edit: bool,
}

impl ExportFile {
    fn new(
        id: ImageId,
        image: &Image,
        directory: &Path,
        base_name: String,
        with_originals: bool,
    ) -> Self {
        let extension = file_extension(&image.path);
        let path = directory.join(file_name_with_extension(&base_name, extension.as_deref()));

        let original_path = match (&image.original_path, with_originals) {
            (Some(original), true) => {
                let extension = file_extension(original);
                Some(
                    directory
                        .join(ORIGINALS_FOLDER)
                        .join(file_name_with_extension(&base_name, extension.as_deref())),
                )
            }
            _ => None,
        };

        Self {
            image: id,
            source: image.path.clone(),
            base_name,
            path,
            original_source: image.original_path.clone(),
            original_path,
            rotation_is_only_edit: image.rotation_is_only_edit,
        }
    }

    /// Check whether an existing file is this export's target
    pub fn is_part_of(&self, file: &Path) -> bool {
        self.path == file
    }

    /// Whether the original should be exported next to the edited file
    pub fn exports_original(&self) -> bool {
        self.original_path.is_some() && self.original_source.is_some() && !self.rotation_is_only_edit
    }
}

/// One planned target directory, bound to a source container
#[derive(Debug, Clone)]
pub struct ExportDirectory {
    /// Path relative to the export root, `/`-separated
    pub relative_path: String,
    pub path: PathBuf,
    pub container_name: String,
    /// Lower-cased base name -> export file
    files: BTreeMap<String, ExportFile>,
}

impl ExportDirectory {
    pub fn new(export_root: &Path, relative_path: String, container_name: String) -> Self {
        let relative_path = nfc(&relative_path);
        let path = relative_path
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(export_root.to_path_buf(), |p, segment| p.join(segment));

        Self {
            relative_path,
            path,
            container_name,
            files: BTreeMap::new(),
        }
    }

    /// Add a container's images in source order, naming each with the image
    /// name template. Returns the number of images added.
    pub fn add_images<'a, I>(&mut self, images: I, templates: &TemplateEngine, with_originals: bool) -> usize
    where
        I: IntoIterator<Item = (ImageId, &'a Image)>,
    {
        let images: Vec<(ImageId, &Image)> = images.into_iter().collect();
        let total = images.len();

        for (position, (id, image)) in images.into_iter().enumerate() {
            let index = position + 1;
            let context = ImageNameContext::new(
                image,
                &self.container_name,
                index,
                padded_index(index, total),
            );
            let base_name = self.make_unique_base_name(&nfc(&templates.image_base_name(&context)));
            let file = ExportFile::new(id, image, &self.path, base_name.clone(), with_originals);
            self.files.insert(base_name.to_lowercase(), file);
        }

        total
    }

    /// Append `_1`, `_2`, ... until the lower-cased name is unused in this directory
    fn make_unique_base_name(&self, base_name: &str) -> String {
        let mut index = 0;
        loop {
            let candidate = if index > 0 {
                format!("{}_{}", base_name, index)
            } else {
                base_name.to_string()
            };
            if !self.files.contains_key(&candidate.to_lowercase()) {
                return candidate;
            }
            index += 1;
        }
    }

    /// Look up an expected file by base name, ignoring case and Unicode
    /// composition
    pub fn file(&self, base_name: &str) -> Option<&ExportFile> {
        self.files.get(&nfc(base_name).to_lowercase())
    }

    /// Expected files, ordered by lower-cased base name
    pub fn files(&self) -> impl Iterator<Item = &ExportFile> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Planning state threaded explicitly through every planning pass
#[derive(Debug, Clone, Default)]
pub struct PlanContext {
    /// Lower-cased relative folder paths already assigned in this run
    used_folders: HashSet<String>,
}

impl PlanContext {
    pub fn is_used(&self, folder: &str) -> bool {
        self.used_folders.contains(&folder.to_lowercase())
    }

    pub fn reserve(&mut self, folder: &str) {
        self.used_folders.insert(folder.to_lowercase());
    }

    /// Returns `folder`, or `folder_(n)` with the smallest free `n >= 1`
    pub fn find_unused_folder(&self, folder: &str) -> String {
        let mut index = 0;
        loop {
            let proposed = if index > 0 {
                format!("{}_({})", folder, index)
            } else {
                folder.to_string()
            };
            if !self.is_used(&proposed) {
                return proposed;
            }
            index += 1;
        }
    }
}

/// The root of the export tree
#[derive(Debug, Clone)]
pub struct ExportLibrary {
    root: PathBuf,
    directories: BTreeMap<String, ExportDirectory>,
    context: PlanContext,
    cancel: CancellationToken,
}

impl ExportLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_cancel_token(root, CancellationToken::new())
    }

    pub fn with_cancel_token(root: impl Into<PathBuf>, cancel: CancellationToken) -> Self {
        Self {
            root: root.into(),
            directories: BTreeMap::new(),
            context: PlanContext::default(),
            cancel,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn context(&self) -> &PlanContext {
        &self.context
    }

    /// Register a planned directory and reserve its folder name
    pub fn insert(&mut self, directory: ExportDirectory) {
        self.context.reserve(&directory.relative_path);
        self.directories.insert(directory.relative_path.clone(), directory);
    }

    /// Planned directories, ordered by relative path
    pub fn directories(&self) -> impl Iterator<Item = &ExportDirectory> {
        self.directories.values()
    }

    pub fn directory(&self, relative_path: &str) -> Option<&ExportDirectory> {
        self.directories.get(relative_path)
    }

    pub fn directory_count(&self) -> usize {
        self.directories.len()
    }

    pub fn file_count(&self) -> usize {
        self.directories.values().map(ExportDirectory::len).sum()
    }

    /// Absolute paths of every planned directory
    pub fn managed_paths(&self) -> HashSet<PathBuf> {
        self.directories.values().map(|d| d.path.clone()).collect()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Signal that a running export should stop as soon as possible
    pub fn abort(&self) {
        self.cancel.cancel();
    }

    pub fn is_aborted(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templates() -> TemplateEngine {
        TemplateEngine::new("{{title}}", "{{name}}").unwrap()
    }

    #[test]
    fn test_find_unused_folder() {
        let mut context = PlanContext::default();
        assert_eq!(context.find_unused_folder("Trip"), "Trip");

        context.reserve("Trip");
        assert_eq!(context.find_unused_folder("Trip"), "Trip_(1)");
        assert_eq!(context.find_unused_folder("TRIP"), "TRIP_(1)");

        context.reserve("Trip_(1)");
        assert_eq!(context.find_unused_folder("Trip"), "Trip_(2)");
    }

    #[test]
    fn test_add_images_resolves_collisions() {
        let images = vec![
            Image::new("1", "/lib/a.jpg").unwrap().with_caption("Vacation"),
            Image::new("2", "/lib/b.jpg").unwrap().with_caption("vacation"),
            Image::new("3", "/lib/c.png").unwrap().with_caption("VACATION"),
        ];
        let mut directory = ExportDirectory::new(Path::new("/export"), "Trip".into(), "Trip".into());
        let added = directory.add_images(
            images.iter().enumerate().map(|(i, img)| (ImageId(i), img)),
            &templates(),
            false,
        );

        assert_eq!(added, 3);
        let names: Vec<&str> = directory.files().map(|f| f.base_name.as_str()).collect();
        assert_eq!(names, vec!["Vacation", "vacation_1", "VACATION_2"]);
        assert_eq!(
            directory.file("VACATION_1").unwrap().path,
            PathBuf::from("/export/Trip/vacation_1.jpg")
        );
        assert_eq!(
            directory.file("vacation_2").unwrap().path,
            PathBuf::from("/export/Trip/VACATION_2.png")
        );
    }

    #[test]
    fn test_file_lookup_ignores_unicode_composition() {
        let decomposed = Image::new("1", "/lib/a.jpg").unwrap().with_caption("Cafe\u{301}");
        let mut directory = ExportDirectory::new(Path::new("/export"), "E\u{301}te\u{301}".into(), "Summer".into());
        directory.add_images([(ImageId(0), &decomposed)], &templates(), false);

        assert_eq!(directory.relative_path, "\u{c9}t\u{e9}");
        let file = directory.file("CAFE\u{301}").expect("decomposed lookup");
        assert_eq!(file.base_name, "Caf\u{e9}");
        assert_eq!(file.path, PathBuf::from("/export/\u{c9}t\u{e9}/Caf\u{e9}.jpg"));
        assert!(directory.file("Caf\u{e9}").is_some());
    }

    #[test]
    fn test_original_path() {
        let image = Image::new("1", "/lib/edited/a.jpg")
            .unwrap()
            .with_original("/lib/masters/a.CR2", false);
        let mut directory = ExportDirectory::new(Path::new("/export"), "Trip".into(), "Trip".into());
        directory.add_images([(ImageId(0), &image)], &templates(), true);

        let file = directory.file("a").unwrap();
        assert_eq!(
            file.original_path.as_deref(),
            Some(Path::new("/export/Trip/Originals/a.CR2"))
        );
        assert!(file.exports_original());
    }

    #[test]
    fn test_nested_directory_path() {
        let directory = ExportDirectory::new(Path::new("/export"), "Trips/Europe/Paris".into(), "Paris".into());
        assert_eq!(directory.path, PathBuf::from("/export/Trips/Europe/Paris"));
    }

    #[test]
    fn test_abort() {
        let library = ExportLibrary::new("/export");
        assert!(!library.is_aborted());
        library.abort();
        assert!(library.is_aborted());
        assert!(library.cancel_token().is_cancelled());
    }
}
