//! File records and tree indexes
//!
//! A [`FileRecord`] captures one file's identity as seen by a scan. A
//! [`TreeIndex`] is the scan result for a whole tree, keyed by relative
//! path so the same photo can be matched across source and destination
//! roots.

use std::collections::BTreeMap;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::SnapvaultError;

/// One file as seen by a tree scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path relative to the scanned root; the cross-tree identity
    pub relative_path: PathBuf,

    /// Full path on disk
    pub absolute_path: PathBuf,

    /// Size in bytes
    pub size: u64,

    /// Last modification time
    pub modified: SystemTime,
}

impl FileRecord {
    /// Build a record for `absolute_path` under `root`
    pub fn new(
        root: &Path,
        absolute_path: PathBuf,
        metadata: &Metadata,
    ) -> Result<Self, SnapvaultError> {
        let relative_path = absolute_path
            .strip_prefix(root)
            .map_err(|_| {
                SnapvaultError::Scan(format!(
                    "{} is not under {}",
                    absolute_path.display(),
                    root.display()
                ))
            })?
            .to_path_buf();

        let modified = metadata.modified().map_err(|e| {
            SnapvaultError::Io(format!(
                "Failed to read mtime of {}: {}",
                absolute_path.display(),
                e
            ))
        })?;

        Ok(Self {
            relative_path,
            absolute_path,
            size: metadata.len(),
            modified,
        })
    }

    /// Cheap identity string: size and mtime, no file content
    ///
    /// Used by the checksum cache to decide whether a stored digest still
    /// describes the file on disk.
    pub fn signature(&self) -> String {
        let nanos = self
            .modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        format!("{}_{}", self.size, nanos)
    }
}

/// Scan result for one tree, keyed by relative path
///
/// Backed by a `BTreeMap` so iteration order, and with it every report
/// built from a scan, is deterministic.
#[derive(Debug, Clone, Default)]
pub struct TreeIndex {
    root: PathBuf,
    files: BTreeMap<PathBuf, FileRecord>,
}

impl TreeIndex {
    /// Create an empty index for `root`
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            files: BTreeMap::new(),
        }
    }

    /// The scanned root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Add a record, replacing any previous record for the same
    /// relative path
    pub fn insert(&mut self, record: FileRecord) {
        self.files.insert(record.relative_path.clone(), record);
    }

    /// Look up a record by relative path
    pub fn get(&self, relative_path: &Path) -> Option<&FileRecord> {
        self.files.get(relative_path)
    }

    /// Whether the index holds a record for `relative_path`
    pub fn contains(&self, relative_path: &Path) -> bool {
        self.files.contains_key(relative_path)
    }

    /// Number of files in the index
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Records in relative-path order
    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values()
    }

    /// Relative paths in order
    pub fn relative_paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(|p| p.as_path())
    }

    /// Total size of all indexed files in bytes
    pub fn total_size(&self) -> u64 {
        self.files.values().map(|r| r.size).sum()
    }
}
