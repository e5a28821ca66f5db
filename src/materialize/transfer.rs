use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

const TEMP_PREFIX: &str = ".phoshare-";

/// Copy `source` over `target`. The bytes go to a temporary file in the target
/// directory first, which is renamed into place once complete, so readers
/// never observe a truncated target. The source modification time is kept.
pub async fn copy_file(source: &Path, target: &Path) -> Result<(), std::io::Error> {
    let source = source.to_path_buf();
    let target = target.to_path_buf();
    tokio::task::spawn_blocking(move || copy_atomic(&source, &target))
        .await
        .map_err(std::io::Error::other)?
}

fn copy_atomic(source: &Path, target: &Path) -> Result<(), std::io::Error> {
    let directory = target
        .parent()
        .ok_or_else(|| std::io::Error::new(ErrorKind::InvalidInput, "target has no parent directory"))?;

    let mut input = std::fs::File::open(source)?;
    let metadata = input.metadata()?;

    let mut temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(directory)?;
    std::io::copy(&mut input, temp.as_file_mut())?;
    temp.as_file().set_permissions(metadata.permissions())?;
    temp.as_file().set_modified(metadata.modified()?)?;
    temp.as_file().sync_all()?;
    temp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// Hard-link `source` at `target`, replacing any existing target
pub async fn link_file(source: &Path, target: &Path) -> Result<(), std::io::Error> {
    let temp = temp_link_path(target)?;

    match fs::remove_file(&temp).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    fs::hard_link(source, &temp).await?;
    let renamed = fs::rename(&temp, target).await;
    // rename() is a no-op when both names already point at the same inode
    if fs::try_exists(&temp).await.unwrap_or(false) {
        let _ = fs::remove_file(&temp).await;
    }
    renamed
}

fn temp_link_path(target: &Path) -> Result<PathBuf, std::io::Error> {
    let name = target
        .file_name()
        .ok_or_else(|| std::io::Error::new(ErrorKind::InvalidInput, "target has no file name"))?;
    Ok(target.with_file_name(format!("{}{}.link", TEMP_PREFIX, name.to_string_lossy())))
}
