//! Retention cleanup
//!
//! Cleanup removes backup files whose mtime fell out of the retention
//! window, and drains trash batches that have been sitting longer than
//! the same window. Sync will copy anything still in the library right
//! back, so in practice this permanently clears out long-gone files
//! while staying harmless for live ones.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use chrono::{Days, Local, NaiveDate};
use tracing::info;

use super::fs_ops::{purge_expired_trash, remove_or_trash};
use super::orchestrator::BackupManager;
use crate::error::SnapvaultError;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Cleanup outcome for one destination
#[derive(Debug, Clone, Default)]
pub struct DestinationCleanup {
    /// The destination root
    pub destination: PathBuf,
    /// Files outside the retention window, deleted or trashed
    pub files_deleted: usize,
    /// Files still inside the window
    pub files_kept: usize,
    /// Bytes the deleted files occupied
    pub bytes_freed: u64,
    /// Files permanently purged from expired trash batches
    pub trash_purged: usize,
    /// Bytes those trash files occupied
    pub trash_bytes_freed: u64,
    /// Setup and per-file failures
    pub errors: Vec<String>,
    /// Whether the pass stopped early on cancellation
    pub cancelled: bool,
}

/// Aggregate cleanup outcome across destinations
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    /// Retention window in days
    pub keep_days: u32,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// One entry per destination, in configuration order
    pub destinations: Vec<DestinationCleanup>,
    /// Wall-clock time for the whole pass
    pub duration: Duration,
    /// Whether the pass was cancelled before finishing
    pub cancelled: bool,
}

impl CleanupReport {
    pub fn total_deleted(&self) -> usize {
        self.destinations.iter().map(|d| d.files_deleted).sum()
    }

    pub fn total_bytes_freed(&self) -> u64 {
        self.destinations
            .iter()
            .map(|d| d.bytes_freed + d.trash_bytes_freed)
            .sum()
    }

    pub fn total_trash_purged(&self) -> usize {
        self.destinations.iter().map(|d| d.trash_purged).sum()
    }

    pub fn total_errors(&self) -> usize {
        self.destinations.iter().map(|d| d.errors.len()).sum()
    }
}

impl BackupManager {
    /// Apply the retention window to every configured destination
    pub fn cleanup_old_backups(
        &self,
        keep_days: u32,
        dry_run: bool,
    ) -> Result<CleanupReport, SnapvaultError> {
        if self.settings.backup.destinations.is_empty() {
            return Err(SnapvaultError::NoDestinations);
        }

        let started = Instant::now();
        let mut report = CleanupReport {
            keep_days,
            dry_run,
            ..Default::default()
        };

        for destination in &self.settings.backup.destinations {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            let cleaned = self.cleanup_destination(destination, keep_days, dry_run);
            if cleaned.cancelled {
                report.cancelled = true;
            }
            report.destinations.push(cleaned);
        }

        report.duration = started.elapsed();
        info!(
            deleted = report.total_deleted(),
            purged = report.total_trash_purged(),
            errors = report.total_errors(),
            dry_run,
            "Cleanup finished"
        );
        Ok(report)
    }

    /// Apply the retention window to one destination
    ///
    /// A missing destination is recorded as an error in the result; the
    /// other destinations in a batch still get cleaned.
    pub fn cleanup_destination(
        &self,
        destination: &Path,
        keep_days: u32,
        dry_run: bool,
    ) -> DestinationCleanup {
        let mut result = DestinationCleanup {
            destination: destination.to_path_buf(),
            ..Default::default()
        };

        if !destination.is_dir() {
            result.errors.push(format!(
                "Backup directory does not exist: {}",
                destination.display()
            ));
            return result;
        }

        let index = match self.scanner.scan(destination) {
            Ok(index) => index,
            Err(e) => {
                result.errors.push(e.to_string());
                return result;
            }
        };

        let cutoff_time =
            SystemTime::now() - Duration::from_secs(u64::from(keep_days) * SECONDS_PER_DAY);
        for record in index.records() {
            if self.cancel.is_cancelled() {
                result.cancelled = true;
                break;
            }
            if record.modified >= cutoff_time {
                result.files_kept += 1;
                continue;
            }

            if !dry_run {
                if let Err(e) = remove_or_trash(
                    destination,
                    &record.absolute_path,
                    self.settings.backup.use_trash,
                ) {
                    result.errors.push(e.to_string());
                    continue;
                }
            }
            result.files_deleted += 1;
            result.bytes_freed += record.size;
        }

        // Never purge once a cancel has been observed, even one that
        // landed after the last file.
        if self.cancel.is_cancelled() {
            result.cancelled = true;
        }

        if !result.cancelled {
            let cutoff_date = Local::now()
                .date_naive()
                .checked_sub_days(Days::new(u64::from(keep_days)))
                .unwrap_or(NaiveDate::MIN);
            match purge_expired_trash(destination, cutoff_date, dry_run) {
                Ok(purge) => {
                    result.trash_purged = purge.files_removed;
                    result.trash_bytes_freed = purge.bytes_freed;
                }
                Err(e) => result.errors.push(e.to_string()),
            }
        }

        result
    }
}
