use crate::config::Tolerances;
use crate::utils::{inode, modified_secs};
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Why an exported file has to be (re)written
#[derive(Debug, Clone, PartialEq)]
pub enum StaleReason {
    Missing,
    InodeMismatch { target: u64, source: u64 },
    Outdated { target: f64, source: f64 },
    SizeMismatch { target: u64, source: u64 },
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::Missing => write!(f, "missing"),
            StaleReason::InodeMismatch { target, source } => {
                write!(f, "inodes don't match: {} vs. {}", target, source)
            }
            StaleReason::Outdated { target, source } => {
                write!(f, "newer version is available: {:.0} vs. {:.0}", target, source)
            }
            StaleReason::SizeMismatch { target, source } => {
                write!(f, "file size: {} vs. {}", target, source)
            }
        }
    }
}

/// Decide whether `target` must be exported from the already resolved `source`.
///
/// Checks, in order: existence, inode identity (link mode only), modification
/// time with the fudge window, then size difference (when `check_size`).
/// Returns `None` when the target is current.
pub async fn check_need_to_export(
    target: &Path,
    source: &Path,
    link: bool,
    tolerances: &Tolerances,
    check_size: bool,
) -> Result<Option<StaleReason>, std::io::Error> {
    let target_meta = match fs::metadata(target).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Some(StaleReason::Missing)),
        Err(e) => return Err(e),
    };
    let source_meta = fs::metadata(source).await?;

    if link {
        if let (Some(target_ino), Some(source_ino)) = (inode(&target_meta), inode(&source_meta)) {
            if target_ino != source_ino {
                return Ok(Some(StaleReason::InodeMismatch {
                    target: target_ino,
                    source: source_ino,
                }));
            }
        }
    }

    let target_mtime = modified_secs(&target_meta)?;
    let source_mtime = modified_secs(&source_meta)?;
    if target_mtime + (tolerances.mtime_fudge_secs as f64) < source_mtime {
        return Ok(Some(StaleReason::Outdated {
            target: target_mtime,
            source: source_mtime,
        }));
    }

    if check_size {
        // Titles swapped between images can leave a current-looking file with
        // someone else's content; sizes catch most of those.
        let diff = target_meta.len().abs_diff(source_meta.len());
        if diff > tolerances.max_size_diff || (link && diff > tolerances.link_size_diff) {
            return Ok(Some(StaleReason::SizeMismatch {
                target: target_meta.len(),
                source: source_meta.len(),
            }));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration, SystemTime};

    fn write_with_mtime(path: &Path, len: usize, mtime: SystemTime) {
        std::fs::write(path, vec![b'x'; len]).unwrap();
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_target() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("s.jpg");
        std::fs::write(&source, b"x").unwrap();

        let reason = check_need_to_export(&temp.path().join("t.jpg"), &source, false, &Tolerances::default(), true)
            .await
            .unwrap();
        assert_eq!(reason, Some(StaleReason::Missing));
    }

    #[tokio::test]
    async fn test_older_target_is_stale_even_with_equal_size() {
        let temp = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let source = temp.path().join("s.jpg");
        let target = temp.path().join("t.jpg");
        write_with_mtime(&source, 100, now);
        write_with_mtime(&target, 100, now - Duration::from_secs(60));

        let reason = check_need_to_export(&target, &source, false, &Tolerances::default(), true)
            .await
            .unwrap();
        assert!(matches!(reason, Some(StaleReason::Outdated { .. })));
    }

    #[tokio::test]
    async fn test_mtime_within_fudge_window_is_current() {
        let temp = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let source = temp.path().join("s.jpg");
        let target = temp.path().join("t.jpg");
        write_with_mtime(&source, 100, now);
        write_with_mtime(&target, 100, now - Duration::from_secs(2));

        let reason = check_need_to_export(&target, &source, false, &Tolerances::default(), true)
            .await
            .unwrap();
        assert_eq!(reason, None);
    }

    #[tokio::test]
    async fn test_newer_target_with_large_size_difference_is_stale() {
        let temp = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let source = temp.path().join("s.jpg");
        let target = temp.path().join("t.jpg");
        write_with_mtime(&source, 100, now - Duration::from_secs(600));
        write_with_mtime(&target, 70_000, now);

        let tolerances = Tolerances::default();
        let reason = check_need_to_export(&target, &source, false, &tolerances, true)
            .await
            .unwrap();
        assert_eq!(
            reason,
            Some(StaleReason::SizeMismatch {
                target: 70_000,
                source: 100
            })
        );

        let reason = check_need_to_export(&target, &source, false, &tolerances, false)
            .await
            .unwrap();
        assert_eq!(reason, None);
    }

    #[tokio::test]
    async fn test_small_size_difference_tolerated_only_when_copying() {
        let temp = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let source = temp.path().join("s.jpg");
        let target = temp.path().join("t.jpg");
        write_with_mtime(&source, 100, now);
        write_with_mtime(&target, 200, now);

        let tolerances = Tolerances::default();
        let reason = check_need_to_export(&target, &source, false, &tolerances, true)
            .await
            .unwrap();
        assert_eq!(reason, None);

        // Link mode: inode check fires first, since these are separate files
        let reason = check_need_to_export(&target, &source, true, &tolerances, true)
            .await
            .unwrap();
        #[cfg(unix)]
        assert!(matches!(reason, Some(StaleReason::InodeMismatch { .. })));
        #[cfg(not(unix))]
        assert!(matches!(reason, Some(StaleReason::SizeMismatch { .. })));
    }
}
