//! Multi-destination backup orchestration
//!
//! [`BackupManager`] owns the scanner, the checksum cache and the
//! configured destinations, and runs whole backup operations: sync to
//! every destination, verify, restore, cleanup, status. Destinations are
//! strictly isolated during sync; one failing drive never stops the
//! copies to the others.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::cancel::CancelToken;
use super::checksum::ChecksumCache;
use super::engine::{DestinationSyncResult, SyncEngine};
use super::scanner::TreeScanner;
use super::verify::{VerificationReport, VerifyMode};
use crate::config::{Settings, SnapvaultPaths};
use crate::error::SnapvaultError;

/// Aggregate outcome of syncing to all destinations
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// The library root that was mirrored
    pub source: PathBuf,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Files found in the source tree
    pub files_scanned: usize,
    /// One result per destination, in configuration order
    pub destinations: Vec<DestinationSyncResult>,
    /// Post-sync quick verifications, when enabled
    pub verifications: Vec<VerificationReport>,
    /// Wall-clock time for the whole pass
    pub duration: Duration,
    /// Whether the pass was cancelled before finishing
    pub cancelled: bool,
}

impl SyncReport {
    pub fn total_copied(&self) -> usize {
        self.destinations.iter().map(|d| d.copied).sum()
    }

    pub fn total_updated(&self) -> usize {
        self.destinations.iter().map(|d| d.updated).sum()
    }

    pub fn total_deleted(&self) -> usize {
        self.destinations.iter().map(|d| d.deleted).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.destinations.iter().map(|d| d.skipped).sum()
    }

    pub fn total_bytes_copied(&self) -> u64 {
        self.destinations.iter().map(|d| d.bytes_copied).sum()
    }

    pub fn total_errors(&self) -> usize {
        self.destinations.iter().map(|d| d.errors.len()).sum()
    }

    /// Every destination finished without errors or cancellation
    pub fn success(&self) -> bool {
        !self.cancelled && self.total_errors() == 0
    }
}

/// Runs backup operations against the configured destinations
pub struct BackupManager {
    pub(super) settings: Settings,
    pub(super) scanner: TreeScanner,
    pub(super) cache: ChecksumCache,
    pub(super) cancel: CancelToken,
}

impl BackupManager {
    /// Build a manager from settings, loading the persisted checksum cache
    pub fn new(settings: Settings, paths: &SnapvaultPaths) -> Self {
        let cache_path = paths.checksum_cache_file(&settings.backup.checksum_cache);
        let cache = ChecksumCache::load(cache_path, settings.backup.checksum_algorithm);
        let scanner = TreeScanner::new(
            &settings.backup.exclude_patterns,
            &settings.backup.checksum_cache,
        );

        Self {
            settings,
            scanner,
            cache,
            cancel: CancelToken::new(),
        }
    }

    /// The settings this manager was built from
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// A token that cancels the currently running pass
    ///
    /// Clone it into a ctrl-c handler; the running loop stops at the
    /// next file boundary.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Mirror the source tree into every configured destination
    ///
    /// The source is scanned once and its index shared across
    /// destinations. A destination whose setup fails is reported with
    /// zeroed counts and a single error; the remaining destinations
    /// still run.
    pub fn incremental_sync(&self, dry_run: bool) -> Result<SyncReport, SnapvaultError> {
        let source_root = self.settings.general.source_directory.clone();
        if !source_root.is_dir() {
            return Err(SnapvaultError::SourceMissing(source_root));
        }
        if self.settings.backup.destinations.is_empty() {
            return Err(SnapvaultError::NoDestinations);
        }

        let started = Instant::now();
        let source = self.scanner.scan(&source_root)?;
        info!(files = source.len(), source = %source_root.display(), "Scanned source tree");

        let engine = SyncEngine::new(
            &self.scanner,
            self.settings.backup.use_trash,
            dry_run,
            self.cancel.clone(),
        );

        let mut report = SyncReport {
            source: source_root,
            dry_run,
            files_scanned: source.len(),
            ..Default::default()
        };

        for destination in &self.settings.backup.destinations {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            info!(destination = %destination.display(), "Syncing destination");
            let result = match engine.sync_tree(&source, destination) {
                Ok(result) => result,
                Err(e) => {
                    warn!(
                        destination = %destination.display(),
                        error = %e,
                        "Destination sync failed"
                    );
                    DestinationSyncResult {
                        destination: destination.clone(),
                        errors: vec![format!("Destination sync failed: {}", e)],
                        ..Default::default()
                    }
                }
            };

            if result.cancelled {
                report.cancelled = true;
            }
            info!(
                destination = %destination.display(),
                copied = result.copied,
                updated = result.updated,
                deleted = result.deleted,
                errors = result.errors.len(),
                "Destination done"
            );
            report.destinations.push(result);
        }

        if !dry_run && !report.cancelled && self.settings.backup.enable_verification {
            report.verifications = self.verify_after_sync();
        }

        report.duration = started.elapsed();
        if !dry_run {
            self.save_cache_best_effort();
        }

        Ok(report)
    }

    /// Quick-verify every destination after a live sync
    fn verify_after_sync(&self) -> Vec<VerificationReport> {
        let mut verifications = Vec::new();
        for destination in &self.settings.backup.destinations {
            match self.verify_destination(destination, VerifyMode::Quick) {
                Ok(verification) => verifications.push(verification),
                Err(e) => {
                    // The sync result for this destination already
                    // carries the failure.
                    warn!(
                        destination = %destination.display(),
                        error = %e,
                        "Skipping post-sync verification"
                    );
                }
            }
        }
        verifications
    }

    /// Persist the checksum cache, logging instead of failing
    ///
    /// A lost cache only costs rehashing later.
    pub(super) fn save_cache_best_effort(&self) {
        if let Err(e) = self.cache.save() {
            warn!(error = %e, "Failed to save checksum cache");
        }
    }
}
