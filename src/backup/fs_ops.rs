//! Filesystem primitives for the sync engine
//!
//! Copies preserve mtimes so quick comparisons stay stable across runs.
//! Deletes go through an in-tree trash directory by default, so a bad
//! sync can be undone with a file manager instead of a restore job.
//! Trash entries are grouped under one directory per deletion day;
//! retention is decided on that date, not on the file's own mtime,
//! which a rename preserves.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::warn;

use super::scanner::TRASH_DIR_NAME;
use crate::error::SnapvaultError;

/// Result of a trash purge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrashPurge {
    /// Files permanently removed, or counted in a dry run
    pub files_removed: usize,
    /// Bytes those files occupied
    pub bytes_freed: u64,
}

/// Copy `source` to `destination`, creating parent directories and
/// carrying the source mtime over
pub fn copy_with_metadata(source: &Path, destination: &Path) -> Result<(), SnapvaultError> {
    let metadata = fs::metadata(source).map_err(|e| {
        SnapvaultError::Io(format!("Failed to stat {}: {}", source.display(), e))
    })?;
    let modified = metadata.modified().map_err(|e| {
        SnapvaultError::Io(format!(
            "Failed to read mtime of {}: {}",
            source.display(),
            e
        ))
    })?;

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            SnapvaultError::Io(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    fs::copy(source, destination).map_err(|e| {
        SnapvaultError::Io(format!(
            "Failed to copy {} to {}: {}",
            source.display(),
            destination.display(),
            e
        ))
    })?;

    let file = fs::OpenOptions::new()
        .write(true)
        .open(destination)
        .map_err(|e| {
            SnapvaultError::Io(format!(
                "Failed to reopen {}: {}",
                destination.display(),
                e
            ))
        })?;
    file.set_modified(modified).map_err(|e| {
        SnapvaultError::Io(format!(
            "Failed to set mtime of {}: {}",
            destination.display(),
            e
        ))
    })?;

    Ok(())
}

/// Remove `path` from the tree rooted at `tree_root`
///
/// With `use_trash` the file is renamed into today's trash batch under
/// its relative path, so the original layout stays recoverable. The
/// trash lives on the same filesystem, which keeps the move a rename.
pub fn remove_or_trash(
    tree_root: &Path,
    path: &Path,
    use_trash: bool,
) -> Result<(), SnapvaultError> {
    if !use_trash {
        return fs::remove_file(path).map_err(|e| {
            SnapvaultError::Io(format!("Failed to remove {}: {}", path.display(), e))
        });
    }

    let relative = path.strip_prefix(tree_root).map_err(|_| {
        SnapvaultError::Io(format!(
            "{} is not under {}",
            path.display(),
            tree_root.display()
        ))
    })?;

    let batch = tree_root
        .join(TRASH_DIR_NAME)
        .join(Local::now().date_naive().to_string());
    let target = unique_trash_target(&batch, relative);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            SnapvaultError::Io(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    fs::rename(path, &target).map_err(|e| {
        SnapvaultError::Io(format!(
            "Failed to move {} to trash: {}",
            path.display(),
            e
        ))
    })
}

/// Pick a trash path that does not collide with earlier deletes
fn unique_trash_target(batch: &Path, relative: &Path) -> PathBuf {
    let base = batch.join(relative);
    if !base.exists() {
        return base;
    }

    let name = base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "trashed".to_string());
    let mut counter = 1;
    loop {
        let candidate = base.with_file_name(format!("{}.{}", name, counter));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Permanently delete trash batches from before `cutoff`
///
/// Each batch directory is named for its deletion day; batches dated
/// before the cutoff are removed whole. Entries that do not look like a
/// batch are left alone. With `dry_run` the purge is only counted.
pub fn purge_expired_trash(
    tree_root: &Path,
    cutoff: NaiveDate,
    dry_run: bool,
) -> Result<TrashPurge, SnapvaultError> {
    let trash_root = tree_root.join(TRASH_DIR_NAME);
    if !trash_root.is_dir() {
        return Ok(TrashPurge::default());
    }

    let entries = fs::read_dir(&trash_root).map_err(|e| {
        SnapvaultError::Io(format!("Failed to read {}: {}", trash_root.display(), e))
    })?;

    let mut purge = TrashPurge::default();
    for entry_result in entries {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable trash entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let name = entry.file_name();
        let Some(batch_date) = name
            .to_str()
            .and_then(|n| NaiveDate::parse_from_str(n, "%Y-%m-%d").ok())
        else {
            warn!(path = %path.display(), "Ignoring foreign directory in trash");
            continue;
        };
        if batch_date >= cutoff {
            continue;
        }

        let (files, bytes) = batch_totals(&path);
        if !dry_run {
            if let Err(e) = fs::remove_dir_all(&path) {
                warn!(path = %path.display(), error = %e, "Failed to purge trash batch");
                continue;
            }
        }
        purge.files_removed += files;
        purge.bytes_freed += bytes;
    }

    Ok(purge)
}

/// Count files and bytes inside a trash batch
fn batch_totals(batch: &Path) -> (usize, u64) {
    let mut files = 0;
    let mut bytes = 0;
    let mut stack = vec![batch.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if let Ok(metadata) = entry.metadata() {
                files += 1;
                bytes += metadata.len();
            }
        }
    }

    (files, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::compare::mtimes_close;
    use chrono::Days;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// The single dated batch directory inside a tree's trash
    fn only_batch(tree_root: &Path) -> PathBuf {
        let trash = tree_root.join(TRASH_DIR_NAME);
        let mut entries: Vec<_> = fs::read_dir(trash)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(entries.len(), 1);
        entries.pop().unwrap()
    }

    #[test]
    fn test_copy_preserves_content_and_mtime() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("src").join("photo.jpg");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, b"pixels").unwrap();
        let old = SystemTime::now() - Duration::from_secs(7 * 24 * 60 * 60);
        let file = fs::OpenOptions::new().write(true).open(&source).unwrap();
        file.set_modified(old).unwrap();

        let destination = dir.path().join("dst").join("2024").join("photo.jpg");
        copy_with_metadata(&source, &destination).unwrap();

        assert_eq!(fs::read(&destination).unwrap(), b"pixels");
        let source_mtime = fs::metadata(&source).unwrap().modified().unwrap();
        let dest_mtime = fs::metadata(&destination).unwrap().modified().unwrap();
        assert!(mtimes_close(source_mtime, dest_mtime));
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let dir = tempdir().unwrap();
        let result = copy_with_metadata(
            &dir.path().join("absent.jpg"),
            &dir.path().join("copy.jpg"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_plain_remove_unlinks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doomed.jpg");
        fs::write(&path, b"x").unwrap();

        remove_or_trash(dir.path(), &path, false).unwrap();
        assert!(!path.exists());
        assert!(!dir.path().join(TRASH_DIR_NAME).exists());
    }

    #[test]
    fn test_trash_keeps_relative_layout_in_dated_batch() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("2024").join("03");
        fs::create_dir_all(&nested).unwrap();
        let path = nested.join("old.jpg");
        fs::write(&path, b"old").unwrap();

        remove_or_trash(dir.path(), &path, true).unwrap();
        assert!(!path.exists());

        let batch = only_batch(dir.path());
        let batch_name = batch.file_name().unwrap().to_str().unwrap().to_string();
        assert!(NaiveDate::parse_from_str(&batch_name, "%Y-%m-%d").is_ok());
        let trashed = batch.join("2024").join("03").join("old.jpg");
        assert_eq!(fs::read(trashed).unwrap(), b"old");
    }

    #[test]
    fn test_trash_collisions_get_numbered() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("same.jpg");

        fs::write(&path, b"first").unwrap();
        remove_or_trash(dir.path(), &path, true).unwrap();
        fs::write(&path, b"second").unwrap();
        remove_or_trash(dir.path(), &path, true).unwrap();

        let batch = only_batch(dir.path());
        assert_eq!(fs::read(batch.join("same.jpg")).unwrap(), b"first");
        assert_eq!(fs::read(batch.join("same.jpg.1")).unwrap(), b"second");
    }

    #[test]
    fn test_purge_removes_only_expired_batches() {
        let dir = tempdir().unwrap();
        let trash = dir.path().join(TRASH_DIR_NAME);
        let expired = trash.join("2020-06-01").join("2019");
        fs::create_dir_all(&expired).unwrap();
        fs::write(expired.join("ancient.jpg"), b"ancient bytes").unwrap();
        let recent = trash.join(today().to_string());
        fs::create_dir_all(&recent).unwrap();
        fs::write(recent.join("recent.jpg"), b"recent").unwrap();

        let cutoff = today().checked_sub_days(Days::new(30)).unwrap();
        let purge = purge_expired_trash(dir.path(), cutoff, false).unwrap();

        assert_eq!(purge.files_removed, 1);
        assert_eq!(purge.bytes_freed, 13);
        assert!(!trash.join("2020-06-01").exists());
        assert!(recent.join("recent.jpg").exists());
    }

    #[test]
    fn test_purge_dry_run_counts_without_deleting() {
        let dir = tempdir().unwrap();
        let expired = dir.path().join(TRASH_DIR_NAME).join("2020-06-01");
        fs::create_dir_all(&expired).unwrap();
        fs::write(expired.join("a.jpg"), b"aaaa").unwrap();
        fs::write(expired.join("b.jpg"), b"bb").unwrap();

        let cutoff = today().checked_sub_days(Days::new(30)).unwrap();
        let purge = purge_expired_trash(dir.path(), cutoff, true).unwrap();

        assert_eq!(purge.files_removed, 2);
        assert_eq!(purge.bytes_freed, 6);
        assert!(expired.join("a.jpg").exists());
        assert!(expired.join("b.jpg").exists());
    }

    #[test]
    fn test_purge_leaves_foreign_directories_alone() {
        let dir = tempdir().unwrap();
        let foreign = dir.path().join(TRASH_DIR_NAME).join("not-a-date");
        fs::create_dir_all(&foreign).unwrap();
        fs::write(foreign.join("kept.jpg"), b"kept").unwrap();

        let cutoff = today().checked_sub_days(Days::new(30)).unwrap();
        let purge = purge_expired_trash(dir.path(), cutoff, false).unwrap();

        assert_eq!(purge, TrashPurge::default());
        assert!(foreign.join("kept.jpg").exists());
    }

    #[test]
    fn test_purge_without_trash_is_a_noop() {
        let dir = tempdir().unwrap();
        let cutoff = today().checked_sub_days(Days::new(30)).unwrap();
        let purge = purge_expired_trash(dir.path(), cutoff, false).unwrap();
        assert_eq!(purge, TrashPurge::default());
    }
}
