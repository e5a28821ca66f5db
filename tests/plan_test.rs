mod common;

use common::{create_test_dir, single_album_catalog};
use phoshare::{
    CatalogBuilder, ContainerKind, ContainerRecord, ExportLibrary, ExportPlanner, FolderRecord, Image,
    Selection, TemplateEngine,
};
use std::collections::HashSet;

#[test]
fn test_base_names_unique_ignoring_case() {
    let images: Vec<Image> = ["Beach", "beach", "BEACH", "beach_1", "Beach.jpg"]
        .iter()
        .enumerate()
        .map(|(i, caption)| {
            Image::new(i.to_string(), format!("/lib/{}.jpg", i))
                .unwrap()
                .with_caption(*caption)
        })
        .collect();
    let catalog = single_album_catalog("Album", ContainerKind::Regular, images);
    let export = create_test_dir();

    let library = common::plan_albums(&catalog, export.path());
    let directory = library.directory("Album").expect("Should plan Album");

    let names: Vec<String> = directory.files().map(|f| f.base_name.to_lowercase()).collect();
    let unique: HashSet<&String> = names.iter().collect();
    assert_eq!(names.len(), 5);
    assert_eq!(unique.len(), 5);
}

#[test]
fn test_selection_passes_share_folder_names() {
    let mut builder = CatalogBuilder::new();
    builder
        .add_image(Image::new("1", "/lib/a.jpg").unwrap().with_faces(vec!["Ann".into()]))
        .unwrap();
    builder.add_container(ContainerRecord::new("Ann", ContainerKind::Regular).with_members(["1"]));
    builder.add_container(ContainerRecord::new("ann", ContainerKind::Smart).with_members(["1"]));
    let catalog = builder.build();

    let templates = TemplateEngine::new("{{title}}", "{{name}}").unwrap();
    let planner = ExportPlanner::new(&catalog, &templates);
    let mut library = ExportLibrary::new("/export");
    planner.plan_containers(&mut library, catalog.top_level(), &Selection::albums());
    planner.plan_containers(&mut library, catalog.top_level(), &Selection::smart_albums());
    let faces = catalog.face_containers();
    planner.plan_containers(&mut library, faces.iter(), &Selection::faces());

    let folders: Vec<&str> = library.directories().map(|d| d.relative_path.as_str()).collect();
    assert_eq!(folders, vec!["Ann", "Ann_(2)", "ann_(1)"]);
}

#[test]
fn test_folder_pattern_and_templates() {
    let mut builder = CatalogBuilder::new();
    let date = chrono::NaiveDate::from_ymd_opt(2021, 7, 4)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    builder
        .add_image(Image::new("1", "/lib/IMG_1.jpg").unwrap().with_date(date))
        .unwrap();
    builder.add_folder(FolderRecord {
        id: 1,
        name: "Trips".into(),
        folder_path: "1/".into(),
    });
    builder.add_folder(FolderRecord {
        id: 2,
        name: "Work".into(),
        folder_path: "2/".into(),
    });
    builder.add_container(
        ContainerRecord::new("Lake", ContainerKind::Regular)
            .in_folder(1)
            .with_date(date)
            .with_members(["1"]),
    );
    builder.add_container(
        ContainerRecord::new("Office", ContainerKind::Regular)
            .in_folder(2)
            .with_members(["1"]),
    );
    let catalog = builder.build();

    let templates = TemplateEngine::new("{{index0}} {{yyyy}}-{{mm}}-{{dd}}", "{{yyyy}} {{name}}").unwrap();
    let selection = Selection::albums().with_folder_pattern("trip").unwrap();
    let library = phoshare::plan(&catalog, catalog.top_level(), &selection, &templates, std::path::Path::new("/export"));

    assert_eq!(library.directory_count(), 1);
    let directory = library.directory("Trips/2021 Lake").expect("Should plan Trips/2021 Lake");
    let file = directory.files().next().unwrap();
    assert_eq!(file.base_name, "1 2021-07-04");
    assert_eq!(file.path, std::path::Path::new("/export/Trips/2021 Lake/1 2021-07-04.jpg"));
}
