//! Mirror sync for a single destination
//!
//! The engine makes one destination tree mirror the source index: new
//! files are copied, stale files rewritten, up-to-date files skipped,
//! and orphans removed. Decisions use size and mtime only; content
//! hashing belongs to verification.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::cancel::CancelToken;
use super::compare::needs_update;
use super::fs_ops::{copy_with_metadata, remove_or_trash};
use super::record::{FileRecord, TreeIndex};
use super::scanner::TreeScanner;
use crate::error::SnapvaultError;

/// Outcome of mirroring one destination
#[derive(Debug, Clone, Default)]
pub struct DestinationSyncResult {
    /// The destination root
    pub destination: PathBuf,
    /// Files newly copied
    pub copied: usize,
    /// Files rewritten because the source changed
    pub updated: usize,
    /// Files already up to date
    pub skipped: usize,
    /// Orphans removed from the destination
    pub deleted: usize,
    /// Bytes written by copies and updates
    pub bytes_copied: u64,
    /// Per-file failures; the pass continues past them
    pub errors: Vec<String>,
    /// Whether the pass stopped early on cancellation
    pub cancelled: bool,
}

impl DestinationSyncResult {
    fn for_destination(destination: &Path) -> Self {
        Self {
            destination: destination.to_path_buf(),
            ..Default::default()
        }
    }
}

/// Mirrors a source index into destination trees
pub struct SyncEngine<'a> {
    scanner: &'a TreeScanner,
    use_trash: bool,
    dry_run: bool,
    cancel: CancelToken,
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        scanner: &'a TreeScanner,
        use_trash: bool,
        dry_run: bool,
        cancel: CancelToken,
    ) -> Self {
        Self {
            scanner,
            use_trash,
            dry_run,
            cancel,
        }
    }

    /// Mirror `source` into `destination_root`
    ///
    /// Setup failures (an uncreatable or unscannable destination) return
    /// an error; per-file failures are recorded in the result and the
    /// pass keeps going.
    pub fn sync_tree(
        &self,
        source: &TreeIndex,
        destination_root: &Path,
    ) -> Result<DestinationSyncResult, SnapvaultError> {
        if !self.dry_run {
            fs::create_dir_all(destination_root).map_err(|e| {
                SnapvaultError::Io(format!(
                    "Failed to create {}: {}",
                    destination_root.display(),
                    e
                ))
            })?;
        }

        let destination = if destination_root.is_dir() {
            self.scanner.scan(destination_root)?
        } else {
            // Dry run against a destination that does not exist yet;
            // everything counts as a planned copy.
            TreeIndex::new(destination_root.to_path_buf())
        };

        let mut result = DestinationSyncResult::for_destination(destination_root);

        for record in source.records() {
            if self.cancel.is_cancelled() {
                result.cancelled = true;
                break;
            }

            let target = destination_root.join(&record.relative_path);
            match destination.get(&record.relative_path) {
                None => {
                    self.write_file(record, &target, true, &mut result);
                }
                Some(existing) if needs_update(record, existing) => {
                    self.write_file(record, &target, false, &mut result);
                }
                Some(_) => {
                    result.skipped += 1;
                }
            }
        }

        if !result.cancelled {
            for backup in destination.records() {
                if self.cancel.is_cancelled() {
                    result.cancelled = true;
                    break;
                }
                if source.contains(&backup.relative_path) {
                    continue;
                }
                self.delete_orphan(backup, destination_root, &mut result);
            }
        }

        Ok(result)
    }

    fn write_file(
        &self,
        record: &FileRecord,
        target: &Path,
        new_file: bool,
        result: &mut DestinationSyncResult,
    ) {
        if !self.dry_run {
            if let Err(e) = copy_with_metadata(&record.absolute_path, target) {
                result.errors.push(e.to_string());
                return;
            }
        }
        debug!(
            path = %record.relative_path.display(),
            new_file,
            dry_run = self.dry_run,
            "Copied file"
        );
        if new_file {
            result.copied += 1;
        } else {
            result.updated += 1;
        }
        result.bytes_copied += record.size;
    }

    fn delete_orphan(
        &self,
        backup: &FileRecord,
        destination_root: &Path,
        result: &mut DestinationSyncResult,
    ) {
        if !self.dry_run {
            if let Err(e) = remove_or_trash(destination_root, &backup.absolute_path, self.use_trash)
            {
                result.errors.push(e.to_string());
                return;
            }
        }
        debug!(
            path = %backup.relative_path.display(),
            dry_run = self.dry_run,
            "Removed orphan"
        );
        result.deleted += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::scanner::TRASH_DIR_NAME;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    fn scanner() -> TreeScanner {
        TreeScanner::new(&[], ".snapvault_checksums.json")
    }

    fn engine<'a>(scanner: &'a TreeScanner, use_trash: bool, dry_run: bool) -> SyncEngine<'a> {
        SyncEngine::new(scanner, use_trash, dry_run, CancelToken::new())
    }

    fn write(root: &Path, relative: &str, contents: &[u8]) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        let file = fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(time).unwrap();
    }

    #[test]
    fn test_fresh_sync_copies_all_files() {
        let dir = tempdir().unwrap();
        let source_root = dir.path().join("library");
        let dest_root = dir.path().join("backup");
        write(&source_root, "2024/03/beach.jpg", b"beach");
        write(&source_root, "2024/04/hike.jpg", b"hike!");

        let scanner = scanner();
        let source = scanner.scan(&source_root).unwrap();
        let result = engine(&scanner, false, false)
            .sync_tree(&source, &dest_root)
            .unwrap();

        assert_eq!(result.copied, 2);
        assert_eq!(result.updated, 0);
        assert_eq!(result.deleted, 0);
        assert_eq!(result.bytes_copied, 10);
        assert!(result.errors.is_empty());
        assert_eq!(
            fs::read(dest_root.join("2024/03/beach.jpg")).unwrap(),
            b"beach"
        );
    }

    #[test]
    fn test_second_sync_skips_everything() {
        let dir = tempdir().unwrap();
        let source_root = dir.path().join("library");
        let dest_root = dir.path().join("backup");
        write(&source_root, "a.jpg", b"aa");
        write(&source_root, "b.jpg", b"bb");

        let scanner = scanner();
        let source = scanner.scan(&source_root).unwrap();
        let engine = engine(&scanner, false, false);
        engine.sync_tree(&source, &dest_root).unwrap();

        let source = scanner.scan(&source_root).unwrap();
        let result = engine.sync_tree(&source, &dest_root).unwrap();
        assert_eq!(result.copied, 0);
        assert_eq!(result.updated, 0);
        assert_eq!(result.skipped, 2);
        assert_eq!(result.bytes_copied, 0);
    }

    #[test]
    fn test_newer_source_mtime_triggers_update() {
        let dir = tempdir().unwrap();
        let source_root = dir.path().join("library");
        let dest_root = dir.path().join("backup");
        let photo = write(&source_root, "edit.jpg", b"v1");
        set_mtime(&photo, SystemTime::now() - Duration::from_secs(60 * 60));

        let scanner = scanner();
        let source = scanner.scan(&source_root).unwrap();
        let engine = engine(&scanner, false, false);
        engine.sync_tree(&source, &dest_root).unwrap();

        // Same size, newer mtime.
        fs::write(&photo, b"v2").unwrap();
        let source = scanner.scan(&source_root).unwrap();
        let result = engine.sync_tree(&source, &dest_root).unwrap();

        assert_eq!(result.updated, 1);
        assert_eq!(result.copied, 0);
        assert_eq!(fs::read(dest_root.join("edit.jpg")).unwrap(), b"v2");
    }

    #[test]
    fn test_orphans_are_deleted() {
        let dir = tempdir().unwrap();
        let source_root = dir.path().join("library");
        let dest_root = dir.path().join("backup");
        write(&source_root, "keep.jpg", b"keep");
        write(&dest_root, "stray.jpg", b"stray");
        write(&dest_root, "2020/removed.jpg", b"old");

        let scanner = scanner();
        let source = scanner.scan(&source_root).unwrap();
        let result = engine(&scanner, false, false)
            .sync_tree(&source, &dest_root)
            .unwrap();

        assert_eq!(result.deleted, 2);
        assert!(!dest_root.join("stray.jpg").exists());
        assert!(!dest_root.join("2020/removed.jpg").exists());
        assert!(dest_root.join("keep.jpg").exists());
    }

    #[test]
    fn test_deleted_orphans_land_in_trash() {
        let dir = tempdir().unwrap();
        let source_root = dir.path().join("library");
        let dest_root = dir.path().join("backup");
        write(&source_root, "keep.jpg", b"keep");
        write(&dest_root, "2020/old.jpg", b"precious");

        let scanner = scanner();
        let source = scanner.scan(&source_root).unwrap();
        let result = engine(&scanner, true, false)
            .sync_tree(&source, &dest_root)
            .unwrap();

        assert_eq!(result.deleted, 1);
        let batch = fs::read_dir(dest_root.join(TRASH_DIR_NAME))
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        assert_eq!(fs::read(batch.join("2020/old.jpg")).unwrap(), b"precious");
    }

    #[test]
    fn test_trash_survives_later_syncs() {
        let dir = tempdir().unwrap();
        let source_root = dir.path().join("library");
        let dest_root = dir.path().join("backup");
        write(&source_root, "keep.jpg", b"keep");
        write(&dest_root, "old.jpg", b"old");

        let scanner = scanner();
        let engine = engine(&scanner, true, false);
        let source = scanner.scan(&source_root).unwrap();
        engine.sync_tree(&source, &dest_root).unwrap();

        // The trashed file is not an orphan on the next pass.
        let source = scanner.scan(&source_root).unwrap();
        let result = engine.sync_tree(&source, &dest_root).unwrap();
        assert_eq!(result.deleted, 0);
        let batch = fs::read_dir(dest_root.join(TRASH_DIR_NAME))
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        assert!(batch.join("old.jpg").exists());
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let dir = tempdir().unwrap();
        let source_root = dir.path().join("library");
        let dest_root = dir.path().join("backup");
        write(&source_root, "new.jpg", b"new");
        write(&dest_root, "orphan.jpg", b"orphan");

        let scanner = scanner();
        let source = scanner.scan(&source_root).unwrap();
        let result = engine(&scanner, false, true)
            .sync_tree(&source, &dest_root)
            .unwrap();

        assert_eq!(result.copied, 1);
        assert_eq!(result.deleted, 1);
        assert_eq!(result.bytes_copied, 3);
        assert!(!dest_root.join("new.jpg").exists());
        assert!(dest_root.join("orphan.jpg").exists());
    }

    #[test]
    fn test_dry_run_does_not_create_destination() {
        let dir = tempdir().unwrap();
        let source_root = dir.path().join("library");
        let dest_root = dir.path().join("backup");
        write(&source_root, "new.jpg", b"new");

        let scanner = scanner();
        let source = scanner.scan(&source_root).unwrap();
        let result = engine(&scanner, false, true)
            .sync_tree(&source, &dest_root)
            .unwrap();

        assert_eq!(result.copied, 1);
        assert!(!dest_root.exists());
    }

    #[test]
    fn test_cancelled_pass_stops_early() {
        let dir = tempdir().unwrap();
        let source_root = dir.path().join("library");
        let dest_root = dir.path().join("backup");
        write(&source_root, "a.jpg", b"a");
        write(&source_root, "b.jpg", b"b");

        let scanner = scanner();
        let cancel = CancelToken::new();
        cancel.cancel();
        let engine = SyncEngine::new(&scanner, false, false, cancel);

        let source = scanner.scan(&source_root).unwrap();
        let result = engine.sync_tree(&source, &dest_root).unwrap();

        assert!(result.cancelled);
        assert_eq!(result.copied, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_reported_not_fatal() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let source_root = dir.path().join("library");
        let dest_root = dir.path().join("backup");
        write(&source_root, "good.jpg", b"good");
        let locked = write(&source_root, "locked.jpg", b"locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::File::open(&locked).is_ok() {
            // Privileged test run; permission bits do not apply.
            return;
        }

        let scanner = scanner();
        let source = scanner.scan(&source_root).unwrap();
        let result = engine(&scanner, false, false)
            .sync_tree(&source, &dest_root)
            .unwrap();

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

        assert_eq!(result.copied, 1);
        assert_eq!(result.errors.len(), 1);
        assert!(dest_root.join("good.jpg").exists());
        assert!(!dest_root.join("locked.jpg").exists());
    }
}
