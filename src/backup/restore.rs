//! Restore from a backup tree
//!
//! Restore copies files from a backup back under a target directory,
//! optionally filtered by substring patterns. Unlike sync this is never
//! a mirror: it only adds or overwrites files, and a conflict policy
//! decides whether newer files in the target survive.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::fs_ops::copy_with_metadata;
use super::orchestrator::BackupManager;

/// Knobs for a restore pass
#[derive(Debug, Clone)]
pub struct RestoreOptions {
    /// Case-insensitive substrings; a file is restored when its path
    /// contains any of them. Empty restores everything.
    pub patterns: Vec<String>,
    /// Recreate the backup's directory layout under the target instead
    /// of flattening every file into the target root
    pub preserve_structure: bool,
    /// Overwrite existing target files even when they are newer than
    /// the backup copy
    pub overwrite_newer: bool,
    /// Plan and count without copying
    pub dry_run: bool,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            preserve_structure: true,
            overwrite_newer: true,
            dry_run: false,
        }
    }
}

/// Outcome of a restore pass
#[derive(Debug, Clone, Default)]
pub struct RestoreReport {
    /// The backup tree files came from
    pub backup: PathBuf,
    /// The directory files were restored into
    pub target: PathBuf,
    /// Files copied back
    pub files_restored: usize,
    /// Files left alone by the conflict policy
    pub files_skipped: usize,
    /// Bytes copied back
    pub bytes_restored: u64,
    /// Setup and per-file failures
    pub errors: Vec<String>,
    /// Wall-clock time for the pass
    pub duration: Duration,
    /// Whether the pass was cancelled before finishing
    pub cancelled: bool,
    /// Whether this was a dry run
    pub dry_run: bool,
}

impl RestoreReport {
    /// Nothing failed and the pass ran to completion
    pub fn success(&self) -> bool {
        !self.cancelled && self.errors.is_empty()
    }
}

impl BackupManager {
    /// Copy files from `backup_root` back under `target`
    ///
    /// Always returns a report; a missing or empty backup is recorded
    /// as an error in it rather than failing the call.
    pub fn restore_from_backup(
        &self,
        backup_root: &Path,
        target: &Path,
        options: &RestoreOptions,
    ) -> RestoreReport {
        let mut report = RestoreReport {
            backup: backup_root.to_path_buf(),
            target: target.to_path_buf(),
            dry_run: options.dry_run,
            ..Default::default()
        };

        if !backup_root.is_dir() {
            report.errors.push(format!(
                "Backup directory does not exist: {}",
                backup_root.display()
            ));
            return report;
        }

        let started = Instant::now();
        let backup = match self.scanner.scan(backup_root) {
            Ok(backup) => backup,
            Err(e) => {
                report.errors.push(e.to_string());
                return report;
            }
        };
        if backup.is_empty() {
            report
                .errors
                .push(format!("No files found in {}", backup_root.display()));
            return report;
        }

        for record in backup.records() {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            if !matches_patterns(&record.absolute_path, &options.patterns) {
                continue;
            }

            let restore_path = if options.preserve_structure {
                target.join(&record.relative_path)
            } else {
                match record.relative_path.file_name() {
                    Some(name) => target.join(name),
                    None => continue,
                }
            };

            if !options.overwrite_newer {
                if let Ok(existing) = std::fs::metadata(&restore_path) {
                    let target_newer = existing
                        .modified()
                        .map(|target_mtime| record.modified <= target_mtime)
                        .unwrap_or(false);
                    if target_newer {
                        debug!(
                            path = %record.relative_path.display(),
                            "Skipping, target copy is newer"
                        );
                        report.files_skipped += 1;
                        continue;
                    }
                }
            }

            if !options.dry_run {
                if let Err(e) = copy_with_metadata(&record.absolute_path, &restore_path) {
                    report.errors.push(e.to_string());
                    continue;
                }
            }
            debug!(
                path = %record.relative_path.display(),
                dry_run = options.dry_run,
                "Restored file"
            );
            report.files_restored += 1;
            report.bytes_restored += record.size;
        }

        report.duration = started.elapsed();
        info!(
            backup = %report.backup.display(),
            restored = report.files_restored,
            skipped = report.files_skipped,
            errors = report.errors.len(),
            dry_run = report.dry_run,
            "Restore finished"
        );
        report
    }
}

/// Whether a path passes the restore pattern filter
fn matches_patterns(path: &Path, patterns: &[String]) -> bool {
    if patterns.is_empty() {
        return true;
    }
    let lowered = path.to_string_lossy().to_lowercase();
    patterns
        .iter()
        .any(|pattern| lowered.contains(&pattern.to_lowercase()))
}
