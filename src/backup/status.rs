//! Backup health overview
//!
//! Status answers "are my backups in a usable state" without copying
//! anything: it checks that every destination exists, counts what it
//! holds, and folds the per-destination states into one overall verdict
//! with actionable recommendations.

use std::path::PathBuf;
use std::time::SystemTime;

use super::orchestrator::BackupManager;

/// Health of a single destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationState {
    /// Present and readable
    Ok,
    /// Directory does not exist
    Missing,
    /// Present but could not be scanned
    Error,
}

impl std::fmt::Display for DestinationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DestinationState::Ok => "ok",
            DestinationState::Missing => "missing",
            DestinationState::Error => "error",
        };
        write!(f, "{}", label)
    }
}

/// Status details for one destination
#[derive(Debug, Clone)]
pub struct DestinationStatus {
    /// The destination root
    pub path: PathBuf,
    /// Health classification
    pub state: DestinationState,
    /// Files found in the destination
    pub file_count: usize,
    /// Total size of those files in bytes
    pub total_size: u64,
    /// Most recent mtime in the destination
    pub last_modified: Option<SystemTime>,
    /// Scan failure, when `state` is [`DestinationState::Error`]
    pub error: Option<String>,
}

/// Folded verdict across all destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallStatus {
    /// Every destination is present and readable
    Good,
    /// At least one destination is usable, at least one is not
    Partial,
    /// No usable destination at all
    Critical,
    /// The source itself is missing; nothing can be judged
    Error,
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OverallStatus::Good => "good",
            OverallStatus::Partial => "partial",
            OverallStatus::Critical => "critical",
            OverallStatus::Error => "error",
        };
        write!(f, "{}", label)
    }
}

/// Full status report
#[derive(Debug, Clone)]
pub struct StatusReport {
    /// The configured library root
    pub source: PathBuf,
    /// Whether the library root exists
    pub source_exists: bool,
    /// Folded verdict
    pub overall: OverallStatus,
    /// Per-destination details, in configuration order
    pub destinations: Vec<DestinationStatus>,
    /// Human-readable next steps
    pub recommendations: Vec<String>,
}

impl BackupManager {
    /// Inspect the source and every destination without changing anything
    pub fn backup_status(&self) -> StatusReport {
        let source = self.settings.general.source_directory.clone();
        let source_exists = source.is_dir();

        let mut report = StatusReport {
            source: source.clone(),
            source_exists,
            overall: OverallStatus::Critical,
            destinations: Vec::new(),
            recommendations: Vec::new(),
        };

        if !source_exists {
            report.overall = OverallStatus::Error;
            report.recommendations.push(format!(
                "Source directory does not exist: {}",
                source.display()
            ));
            return report;
        }

        if self.settings.backup.destinations.is_empty() {
            report
                .recommendations
                .push("No backup destinations configured".to_string());
            return report;
        }

        let mut all_good = true;
        for destination in &self.settings.backup.destinations {
            let mut status = DestinationStatus {
                path: destination.clone(),
                state: DestinationState::Missing,
                file_count: 0,
                total_size: 0,
                last_modified: None,
                error: None,
            };

            if destination.is_dir() {
                match self.scanner.scan(destination) {
                    Ok(index) => {
                        status.state = DestinationState::Ok;
                        status.file_count = index.len();
                        status.total_size = index.total_size();
                        status.last_modified = index.records().map(|r| r.modified).max();
                    }
                    Err(e) => {
                        status.state = DestinationState::Error;
                        status.error = Some(e.to_string());
                        all_good = false;
                    }
                }
            } else {
                all_good = false;
                report.recommendations.push(format!(
                    "Create backup directory: {}",
                    destination.display()
                ));
            }

            report.destinations.push(status);
        }

        report.overall = if all_good {
            OverallStatus::Good
        } else if report
            .destinations
            .iter()
            .any(|d| d.state == DestinationState::Ok)
        {
            report
                .recommendations
                .push("Some backups are missing or inaccessible".to_string());
            OverallStatus::Partial
        } else {
            report
                .recommendations
                .push("No accessible backups found".to_string());
            OverallStatus::Critical
        };

        report
    }
}
