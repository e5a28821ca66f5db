use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;
use tokio::fs;

/// Resolve a source path to the file it ultimately refers to, following symlinks.
pub async fn resolve_alias(path: &Path) -> Result<PathBuf, std::io::Error> {
    fs::canonicalize(path).await
}

/// Whether `path` is an existing directory, following symlinks
pub async fn is_directory(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

/// Inode number of a file, on platforms that expose one
#[cfg(unix)]
pub fn inode(metadata: &Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(metadata.ino())
}

#[cfg(not(unix))]
pub fn inode(_metadata: &Metadata) -> Option<u64> {
    None
}

/// Modification time as fractional seconds since the Unix epoch
pub fn modified_secs(metadata: &Metadata) -> Result<f64, std::io::Error> {
    let modified = metadata.modified()?;
    let secs = match modified.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    };
    Ok(secs)
}

/// Check that `path` lies strictly below `root`, comparing whole components.
/// Below the root only plain names are allowed, so `root/a/../../x` is rejected.
pub fn is_descendant(path: &Path, root: &Path) -> bool {
    match path.strip_prefix(root) {
        Ok(rest) => {
            let mut components = rest.components().peekable();
            components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
        }
        Err(_) => false,
    }
}

/// Absolute, canonical form of the export root. The root is created first
/// when `create` is set; otherwise a missing root is only made absolute.
pub async fn resolve_export_root(path: &Path, create: bool) -> Result<PathBuf, std::io::Error> {
    if create {
        fs::create_dir_all(path).await?;
    }
    match fs::canonicalize(path).await {
        Ok(resolved) => Ok(resolved),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => std::path::absolute(path),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_descendant() {
        let root = Path::new("/export");
        assert!(is_descendant(Path::new("/export/a"), root));
        assert!(is_descendant(Path::new("/export/a/b.jpg"), root));
        assert!(!is_descendant(Path::new("/export"), root));
        assert!(!is_descendant(Path::new("/export2/a"), root));
        assert!(!is_descendant(Path::new("/other"), root));
        assert!(!is_descendant(Path::new("/export/../etc"), root));
        assert!(!is_descendant(Path::new("/export/a/../../etc"), root));
    }

    #[test]
    fn test_is_descendant_with_relative_root() {
        let root = Path::new("../export");
        assert!(is_descendant(Path::new("../export/stale.jpg"), root));
        assert!(is_descendant(Path::new("../export/Album/stale.jpg"), root));
        assert!(!is_descendant(Path::new("../export"), root));
        assert!(!is_descendant(Path::new("../export/../other/x.jpg"), root));
        assert!(!is_descendant(Path::new("../export2/x.jpg"), root));
    }

    #[tokio::test]
    async fn test_resolve_export_root() {
        let temp = tempfile::tempdir().unwrap();
        let work = temp.path().join("work");
        std::fs::create_dir_all(&work).unwrap();
        let relative = work.join("../export");

        let missing = resolve_export_root(&relative, false).await.unwrap();
        assert!(missing.is_absolute());
        assert!(!temp.path().join("export").exists());

        let created = resolve_export_root(&relative, true).await.unwrap();
        assert_eq!(created, temp.path().join("export").canonicalize().unwrap());
        assert!(!created.components().any(|c| matches!(c, Component::ParentDir)));
    }

    #[tokio::test]
    async fn test_resolve_alias_follows_symlink() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("real.jpg");
        std::fs::write(&target, b"data").unwrap();

        #[cfg(unix)]
        {
            let link = temp.path().join("alias.jpg");
            std::os::unix::fs::symlink(&target, &link).unwrap();
            let resolved = resolve_alias(&link).await.unwrap();
            assert_eq!(resolved, target.canonicalize().unwrap());
        }

        let resolved = resolve_alias(&target).await.unwrap();
        assert_eq!(resolved, target.canonicalize().unwrap());
    }

    #[tokio::test]
    async fn test_is_directory() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("a.jpg");
        std::fs::write(&file, b"x").unwrap();

        assert!(is_directory(temp.path()).await);
        assert!(!is_directory(&file).await);
        assert!(!is_directory(&temp.path().join("missing")).await);
    }

    #[tokio::test]
    async fn test_resolve_alias_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        assert!(resolve_alias(&temp.path().join("missing.jpg")).await.is_err());
    }
}
