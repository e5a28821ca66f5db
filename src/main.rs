use anyhow::{bail, Context, Result};
use clap::Parser;
use phoshare::{
    read_catalog, read_config, run_export_with_progress, ContainerKind, ExportConfig, ExportLibrary, ExportOptions,
    ExportPlanner, ExportProgress, Limits, Selection, TemplateEngine,
};
use phoshare::utils::resolve_export_root;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Phoshare - exports a photo library's albums into a folder tree and keeps it in sync
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Catalog export (JSON) describing the photo library
    #[arg(long, env = "PHOSHARE_CATALOG")]
    catalog: Option<PathBuf>,

    /// Folder to export into
    #[arg(long, env = "PHOSHARE_EXPORT")]
    export: Option<PathBuf>,

    /// Export regular albums and events whose name starts with this pattern
    #[arg(short = 'a', long = "albums", value_name = "PATTERN")]
    albums: Option<String>,

    /// Export albums inside library folders matching this pattern
    #[arg(short = 'e', long = "folders", value_name = "PATTERN")]
    folders: Option<String>,

    /// Export smart albums whose name starts with this pattern
    #[arg(short = 's', long = "smarts", value_name = "PATTERN")]
    smarts: Option<String>,

    /// Export one album per face
    #[arg(long = "facealbums")]
    face_albums: bool,

    /// Prefix for face album folders
    #[arg(long = "facealbum-prefix")]
    face_album_prefix: Option<String>,

    /// Template for image file names, e.g. "{{index0}} {{title}}"
    #[arg(short = 'n', long = "nametemplate")]
    name_template: Option<String>,

    /// Template for album folder names, e.g. "{{yyyy}}-{{mm}} {{name}}"
    #[arg(long = "foldertemplate")]
    folder_template: Option<String>,

    /// Template for image captions written by metadata tooling
    #[arg(long = "captiontemplate")]
    caption_template: Option<String>,

    /// Delete obsolete files and folders in the export folder
    #[arg(short = 'd', long)]
    delete: bool,

    /// Show what would be done without changing anything
    #[arg(long = "dryrun")]
    dry_run: bool,

    /// Hard-link images instead of copying them
    #[arg(short = 'l', long)]
    link: bool,

    /// Do not update files that already exist in the export folder
    #[arg(long = "no-update")]
    no_update: bool,

    /// Export unedited originals into an Originals subfolder
    #[arg(short = 'o', long)]
    originals: bool,

    /// Maximum number of files to create in this run
    #[arg(long = "max-create")]
    max_create: Option<usize>,

    /// Maximum number of files to update in this run
    #[arg(long = "max-update")]
    max_update: Option<usize>,

    /// Maximum number of files and folders to delete in this run
    #[arg(long = "max-delete")]
    max_delete: Option<usize>,

    /// Update IPTC keywords and captions of exported images
    #[arg(short = 'k', long = "iptc")]
    iptc: bool,

    /// Like --iptc, but check every exported image
    #[arg(short = 'K', long = "iptcall")]
    iptc_all: bool,

    /// Log every per-file decision
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Configuration file
    #[arg(long, env = "PHOSHARE_CONFIG")]
    config: Option<PathBuf>,
}

/// Locate an executable on PATH
fn find_on_path(program: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

async fn load_config(path: Option<&Path>) -> Result<ExportConfig> {
    let Some(path) = path else {
        return Ok(ExportConfig::default());
    };
    let config = read_config(path)
        .await
        .with_context(|| format!("Failed to read configuration {}", path.display()))?;
    if config.is_none() {
        warn!("Configuration file {} not found, using defaults", path.display());
    }
    Ok(config.unwrap_or_default())
}

fn selections(args: &Args, config: &ExportConfig) -> Result<Vec<Selection>> {
    let mut selections = Vec::new();

    if args.albums.is_some() || args.folders.is_some() {
        let mut selection = Selection::albums();
        if let Some(pattern) = &args.albums {
            selection = selection.with_album_pattern(pattern)?;
        }
        if let Some(pattern) = &args.folders {
            selection = selection.with_folder_pattern(pattern)?;
        }
        selections.push(selection);
    }

    if let Some(pattern) = &args.smarts {
        let mut selection = Selection::smart_albums().with_album_pattern(pattern)?;
        if let Some(folders) = &args.folders {
            selection = selection.with_folder_pattern(folders)?;
        }
        selections.push(selection);
    }

    if args.face_albums {
        let prefix = args
            .face_album_prefix
            .clone()
            .unwrap_or_else(|| config.face_album_prefix.clone());
        selections.push(Selection::faces().with_prefix(prefix));
    }

    Ok(selections)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let Some(export_root) = args.export.clone() else {
        bail!("No export folder given (use --export)");
    };
    let Some(catalog_path) = args.catalog.clone() else {
        bail!("No catalog given (use --catalog)");
    };

    let config = load_config(args.config.as_deref()).await?;
    let selections = selections(&args, &config)?;
    if selections.is_empty() {
        bail!("Nothing to export: use at least one of --albums, --folders, --smarts or --facealbums");
    }

    if (args.iptc || args.iptc_all) && find_on_path("exiftool").is_none() {
        bail!("Updating image metadata requires exiftool, which was not found on PATH");
    }

    let name_template = args.name_template.as_deref().unwrap_or(&config.name_template);
    let folder_template = args.folder_template.as_deref().unwrap_or(&config.folder_template);
    let caption_template = args.caption_template.as_deref().unwrap_or(&config.caption_template);
    let templates = TemplateEngine::new(name_template, folder_template).context("Invalid naming template")?;
    TemplateEngine::validate(caption_template).context("Invalid caption template")?;

    let catalog = read_catalog(&catalog_path)
        .await
        .with_context(|| format!("Failed to read catalog {}", catalog_path.display()))?;
    info!(
        "Loaded {} images from {}",
        catalog.images().len(),
        catalog_path.display()
    );

    let options = ExportOptions {
        dry_run: args.dry_run,
        link: args.link,
        delete: args.delete,
        update: !args.no_update,
        originals: args.originals,
        limits: Limits {
            max_create: args.max_create,
            max_update: args.max_update,
            max_delete: args.max_delete,
        },
        ..ExportOptions::from_config(&config)
    };

    let export_root = resolve_export_root(&export_root, !options.dry_run)
        .await
        .with_context(|| format!("Cannot use export folder {}", export_root.display()))?;
    let mut library = ExportLibrary::new(export_root);
    let cancel = library.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing the current folder");
            cancel.cancel();
        }
    });

    let planner = ExportPlanner::new(&catalog, &templates).with_originals(args.originals);
    let top_level = catalog.top_level();
    let faces = catalog.face_containers();
    for selection in &selections {
        if selection.kinds.contains(&ContainerKind::Face) {
            planner.plan_containers(&mut library, faces.iter(), selection);
        } else {
            planner.plan_containers(&mut library, top_level.iter().copied(), selection);
        }
    }
    info!(
        "Planned {} folders with {} files",
        library.directory_count(),
        library.file_count()
    );

    if options.dry_run {
        info!("Dry run, no files will be changed");
    }

    let report = run_export_with_progress(&library, &options, |progress| match progress {
        ExportProgress::DirectoryReconciled(directory) => debug!("Reconciled {}", directory.relative_path),
        ExportProgress::DirectoryMaterialized(directory) => debug!("Exported {}", directory.relative_path),
    })
    .await;

    println!("{}", report);
    Ok(())
}
