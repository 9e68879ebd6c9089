//! Backup verification
//!
//! Compares the source tree against a backup tree and classifies every
//! file as verified, missing, corrupted or extra. Quick mode trusts size
//! and mtime; full mode reads content through the checksum cache and is
//! the only way to catch silent corruption.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::info;

use super::compare::{full_match, quick_match};
use super::orchestrator::BackupManager;
use crate::error::SnapvaultError;

/// How file contents are compared during verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyMode {
    /// Size and mtime only; no file content is read
    Quick,
    /// Content digests through the checksum cache
    Full,
}

/// Outcome of verifying one destination against the source
#[derive(Debug, Clone)]
pub struct VerificationReport {
    /// The source tree files were checked against
    pub source: PathBuf,
    /// The backup tree that was verified
    pub destination: PathBuf,
    /// Comparison mode used
    pub mode: VerifyMode,
    /// Files the source expects the backup to hold
    pub expected_files: usize,
    /// Common files compared, corrupted ones included
    pub verified_files: usize,
    /// Source files absent from the backup
    pub missing_files: BTreeSet<PathBuf>,
    /// Files present in both trees but not matching
    pub corrupted_files: BTreeSet<PathBuf>,
    /// Backup files with no source counterpart
    pub extra_files: BTreeSet<PathBuf>,
    /// Failures hit while comparing individual files
    pub errors: Vec<String>,
    /// Wall-clock time for the verification
    pub duration: Duration,
    /// Whether the pass was cancelled before finishing
    pub cancelled: bool,
}

impl VerificationReport {
    fn new(source: PathBuf, destination: PathBuf, mode: VerifyMode) -> Self {
        Self {
            source,
            destination,
            mode,
            expected_files: 0,
            verified_files: 0,
            missing_files: BTreeSet::new(),
            corrupted_files: BTreeSet::new(),
            extra_files: BTreeSet::new(),
            errors: Vec::new(),
            duration: Duration::ZERO,
            cancelled: false,
        }
    }

    /// A report for a destination that could not be verified at all
    pub(super) fn failed(
        source: PathBuf,
        destination: PathBuf,
        mode: VerifyMode,
        error: String,
    ) -> Self {
        let mut report = Self::new(source, destination, mode);
        report.errors.push(error);
        report
    }

    /// Percentage of expected files found intact
    ///
    /// Corrupted files count against the score, missing files simply do
    /// not add to it. An empty source scores 0, not 100; there is
    /// nothing proven about a backup of nothing.
    pub fn integrity_score(&self) -> f64 {
        if self.expected_files == 0 {
            return 0.0;
        }
        let verified = self.verified_files as f64;
        let corrupted = self.corrupted_files.len() as f64;
        ((verified - corrupted) / self.expected_files as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// No missing, corrupted or extra files, and no errors
    pub fn is_intact(&self) -> bool {
        !self.cancelled
            && self.missing_files.is_empty()
            && self.corrupted_files.is_empty()
            && self.extra_files.is_empty()
            && self.errors.is_empty()
    }
}

impl BackupManager {
    /// Verify every configured destination against the source
    ///
    /// A destination that cannot be verified at all yields a report
    /// carrying the failure instead of aborting the batch.
    pub fn verify_backups(
        &self,
        mode: VerifyMode,
    ) -> Result<Vec<VerificationReport>, SnapvaultError> {
        let source_root = self.settings.general.source_directory.clone();
        if !source_root.is_dir() {
            return Err(SnapvaultError::SourceMissing(source_root));
        }
        if self.settings.backup.destinations.is_empty() {
            return Err(SnapvaultError::NoDestinations);
        }

        let mut reports = Vec::new();
        for destination in &self.settings.backup.destinations {
            if self.cancel.is_cancelled() {
                break;
            }
            let report = match self.verify_destination(destination, mode) {
                Ok(report) => report,
                Err(e) => VerificationReport::failed(
                    source_root.clone(),
                    destination.clone(),
                    mode,
                    e.to_string(),
                ),
            };
            reports.push(report);
        }
        Ok(reports)
    }

    /// Verify one destination against the source
    ///
    /// Fatal only when either root is missing; per-file problems are
    /// collected in the report.
    pub fn verify_destination(
        &self,
        destination: &Path,
        mode: VerifyMode,
    ) -> Result<VerificationReport, SnapvaultError> {
        let source_root = self.settings.general.source_directory.clone();
        if !source_root.is_dir() {
            return Err(SnapvaultError::SourceMissing(source_root));
        }
        if !destination.is_dir() {
            return Err(SnapvaultError::DestinationMissing(destination.to_path_buf()));
        }

        let started = Instant::now();
        let source = self.scanner.scan(&source_root)?;
        let backup = self.scanner.scan(destination)?;

        let mut report =
            VerificationReport::new(source_root, destination.to_path_buf(), mode);
        report.expected_files = source.len();

        for record in source.records() {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let Some(existing) = backup.get(&record.relative_path) else {
                report.missing_files.insert(record.relative_path.clone());
                continue;
            };

            let matches = match mode {
                VerifyMode::Quick => quick_match(record, existing),
                VerifyMode::Full => match full_match(record, existing, &self.cache) {
                    Ok(matches) => matches,
                    Err(e) => {
                        report.errors.push(e.to_string());
                        false
                    }
                },
            };
            report.verified_files += 1;
            if !matches {
                report.corrupted_files.insert(record.relative_path.clone());
            }
        }

        if !report.cancelled {
            for backup_record in backup.records() {
                if !source.contains(&backup_record.relative_path) {
                    report
                        .extra_files
                        .insert(backup_record.relative_path.clone());
                }
            }
        }

        report.duration = started.elapsed();
        info!(
            destination = %report.destination.display(),
            verified = report.verified_files,
            missing = report.missing_files.len(),
            corrupted = report.corrupted_files.len(),
            extra = report.extra_files.len(),
            score = report.integrity_score(),
            "Verification finished"
        );

        if mode == VerifyMode::Full {
            self.save_cache_best_effort();
        }

        Ok(report)
    }
}
