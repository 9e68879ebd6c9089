//! Backup browsing and restore-source discovery
//!
//! Listing reads one backup tree and summarizes it, optionally with a
//! per-file inventory. Candidate discovery runs the same summary over
//! every configured destination and ranks the usable ones so a restore
//! can default to the freshest copy.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::orchestrator::BackupManager;

/// One file inside a backup, as shown by a detailed listing
#[derive(Debug, Clone)]
pub struct ListedFile {
    /// Path relative to the backup root
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Modification time
    pub modified: SystemTime,
    /// Lowercased extension with its dot, empty when none
    pub extension: String,
}

/// Summary of one backup tree
#[derive(Debug, Clone)]
pub struct BackupListing {
    /// The backup root that was inspected
    pub root: PathBuf,
    /// Whether the root exists as a directory
    pub exists: bool,
    /// Files found
    pub total_files: usize,
    /// Total size of those files in bytes
    pub total_size: u64,
    /// Most recent mtime in the tree
    pub last_modified: Option<SystemTime>,
    /// Per-file inventory, populated only for detailed listings
    pub files: Vec<ListedFile>,
    /// Problems hit while listing
    pub errors: Vec<String>,
}

impl BackupListing {
    fn empty(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            exists: root.is_dir(),
            total_files: 0,
            total_size: 0,
            last_modified: None,
            files: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// A backup is usable as a restore source only when it holds files
    pub fn is_usable(&self) -> bool {
        self.exists && self.total_files > 0
    }
}

/// Every configured destination, split by usability
#[derive(Debug, Clone, Default)]
pub struct RestoreCandidates {
    /// Usable backups, newest first
    pub available: Vec<BackupListing>,
    /// Missing or empty destinations
    pub unavailable: Vec<BackupListing>,
    /// Root of the freshest usable backup
    pub recommended: Option<PathBuf>,
}

impl BackupManager {
    /// Summarize one backup tree, with a file inventory when `detailed`
    pub fn list_backup_contents(&self, backup_root: &Path, detailed: bool) -> BackupListing {
        let mut listing = BackupListing::empty(backup_root);
        if !listing.exists {
            listing.errors.push(format!(
                "Backup directory does not exist: {}",
                backup_root.display()
            ));
            return listing;
        }

        let index = match self.scanner.scan(backup_root) {
            Ok(index) => index,
            Err(e) => {
                listing
                    .errors
                    .push(format!("Failed to list backup: {}", e));
                return listing;
            }
        };

        listing.total_files = index.len();
        listing.total_size = index.total_size();
        listing.last_modified = index.records().map(|r| r.modified).max();
        if detailed {
            listing.files = index
                .records()
                .map(|record| ListedFile {
                    path: record.relative_path.clone(),
                    size: record.size,
                    modified: record.modified,
                    extension: record
                        .relative_path
                        .extension()
                        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
                        .unwrap_or_default(),
                })
                .collect();
        }
        listing
    }

    /// Rank every configured destination as a restore source
    pub fn restore_candidates(&self) -> RestoreCandidates {
        let mut candidates = RestoreCandidates::default();
        for destination in &self.settings.backup.destinations {
            let listing = self.list_backup_contents(destination, false);
            if listing.is_usable() {
                candidates.available.push(listing);
            } else {
                candidates.unavailable.push(listing);
            }
        }
        candidates
            .available
            .sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        candidates.recommended = candidates.available.first().map(|l| l.root.clone());
        candidates
    }
}
