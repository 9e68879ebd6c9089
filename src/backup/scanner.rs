//! Tree scanning
//!
//! Walks a library or backup root and builds a [`TreeIndex`] of every
//! regular file that is not excluded. Unreadable subdirectories and
//! entries are logged and skipped so one bad permission bit does not
//! abort a whole backup pass; only an unreadable root is fatal.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::record::{FileRecord, TreeIndex};
use crate::error::SnapvaultError;

/// Directory name used for recoverable deletes inside a backup tree
pub const TRASH_DIR_NAME: &str = ".snapvault_trash";

/// File names that are never backup content
const ALWAYS_EXCLUDED_FILES: [&str; 2] = [".DS_Store", "Thumbs.db"];

/// Walks trees and indexes their files, honoring exclusions
#[derive(Debug, Clone)]
pub struct TreeScanner {
    /// Substring patterns matched case-sensitively against the full path
    exclude_patterns: Vec<String>,
    /// Checksum cache file name, excluded wherever it appears
    cache_file_name: String,
}

impl TreeScanner {
    /// Create a scanner with the configured exclusions
    pub fn new(exclude_patterns: &[String], cache_file_name: &str) -> Self {
        Self {
            exclude_patterns: exclude_patterns.to_vec(),
            cache_file_name: cache_file_name.to_string(),
        }
    }

    /// Walk `root` and index every included file
    pub fn scan(&self, root: &Path) -> Result<TreeIndex, SnapvaultError> {
        if !root.is_dir() {
            return Err(SnapvaultError::Scan(format!(
                "Not a directory: {}",
                root.display()
            )));
        }

        let mut index = TreeIndex::new(root.to_path_buf());
        let mut stack: Vec<PathBuf> = vec![root.to_path_buf()];

        while let Some(dir) = stack.pop() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if dir != root => {
                    warn!(
                        dir = %dir.display(),
                        error = %e,
                        "Skipping unreadable directory"
                    );
                    continue;
                }
                Err(e) => {
                    return Err(SnapvaultError::Scan(format!(
                        "Failed to read {}: {}",
                        root.display(),
                        e
                    )));
                }
            };

            for entry_result in entries {
                let entry = match entry_result {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(
                            dir = %dir.display(),
                            error = %e,
                            "Skipping unreadable directory entry"
                        );
                        continue;
                    }
                };

                let path = entry.path();
                let file_type = match entry.file_type() {
                    Ok(file_type) => file_type,
                    Err(e) => {
                        warn!(
                            path = %path.display(),
                            error = %e,
                            "Skipping entry with unreadable file type"
                        );
                        continue;
                    }
                };

                // Symlinks are not followed; a link into the tree would
                // be indexed twice and a link out of it is not ours to
                // mirror.
                if file_type.is_symlink() {
                    continue;
                }
                if file_type.is_dir() {
                    if entry.file_name() == TRASH_DIR_NAME {
                        continue;
                    }
                    stack.push(path);
                    continue;
                }
                if !file_type.is_file() || self.is_excluded(&path) {
                    continue;
                }

                let metadata = match entry.metadata() {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        warn!(
                            path = %path.display(),
                            error = %e,
                            "Skipping file with unreadable metadata"
                        );
                        continue;
                    }
                };
                match FileRecord::new(root, path, &metadata) {
                    Ok(record) => index.insert(record),
                    Err(e) => {
                        warn!(error = %e, "Skipping file");
                    }
                }
            }
        }

        Ok(index)
    }

    /// Whether `path` is excluded from scanning
    fn is_excluded(&self, path: &Path) -> bool {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name == self.cache_file_name {
                return true;
            }
            if ALWAYS_EXCLUDED_FILES.contains(&name) {
                return true;
            }
        }

        if self.exclude_patterns.is_empty() {
            return false;
        }
        let path_str = path.to_string_lossy();
        self.exclude_patterns
            .iter()
            .any(|pattern| path_str.contains(pattern.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn scanner() -> TreeScanner {
        TreeScanner::new(&[], ".snapvault_checksums.json")
    }

    #[test]
    fn test_scan_collects_nested_files() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("2024").join("03");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("root.jpg"), b"root").unwrap();
        fs::write(nested.join("beach.jpg"), b"beach").unwrap();

        let index = scanner().scan(dir.path()).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.contains(Path::new("root.jpg")));
        assert!(index.contains(Path::new("2024/03/beach.jpg")));
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let dir = tempdir().unwrap();
        let result = scanner().scan(&dir.path().join("nope"));
        assert!(matches!(result, Err(SnapvaultError::Scan(_))));
    }

    #[test]
    fn test_scan_skips_builtin_exclusions() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("keep.jpg"), b"x").unwrap();
        fs::write(dir.path().join(".DS_Store"), b"junk").unwrap();
        fs::write(dir.path().join("Thumbs.db"), b"junk").unwrap();
        fs::write(dir.path().join(".snapvault_checksums.json"), b"{}").unwrap();

        let index = scanner().scan(dir.path()).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.contains(Path::new("keep.jpg")));
    }

    #[test]
    fn test_scan_skips_trash_directory() {
        let dir = tempdir().unwrap();
        let trash = dir.path().join(TRASH_DIR_NAME);
        fs::create_dir_all(&trash).unwrap();
        fs::write(trash.join("deleted.jpg"), b"old").unwrap();
        fs::write(dir.path().join("live.jpg"), b"new").unwrap();

        let index = scanner().scan(dir.path()).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.contains(Path::new("live.jpg")));
    }

    #[test]
    fn test_patterns_match_case_sensitive_substrings() {
        let dir = tempdir().unwrap();
        let upper = dir.path().join("RAW");
        let lower = dir.path().join("raw");
        fs::create_dir_all(&upper).unwrap();
        fs::create_dir_all(&lower).unwrap();
        fs::write(upper.join("img_001.cr2"), b"raw").unwrap();
        fs::write(lower.join("img_002.cr2"), b"raw").unwrap();
        fs::write(dir.path().join("img_003.jpg"), b"jpeg").unwrap();

        let scanner = TreeScanner::new(&["RAW".to_string()], ".snapvault_checksums.json");
        let index = scanner.scan(dir.path()).unwrap();

        assert_eq!(index.len(), 2);
        assert!(index.contains(Path::new("raw/img_002.cr2")));
        assert!(index.contains(Path::new("img_003.jpg")));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_symlinks() {
        use std::os::unix::fs as unix_fs;

        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("real.jpg"), b"real").unwrap();
        unix_fs::symlink(&nested, dir.path().join("nested_link")).unwrap();
        unix_fs::symlink(
            nested.join("real.jpg"),
            dir.path().join("alias.jpg"),
        )
        .unwrap();

        let index = scanner().scan(dir.path()).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.contains(Path::new("nested/real.jpg")));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_survives_unreadable_subdirectory() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        fs::write(dir.path().join("ok.jpg"), b"ok").unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("hidden.jpg"), b"hidden").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Privileged test run; permission bits do not apply.
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = scanner().scan(dir.path());

        // Restore permissions so the tempdir can be removed.
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let index = result.unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.contains(Path::new("ok.jpg")));
    }
}
