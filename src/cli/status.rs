//! Status CLI command

use crate::backup::{BackupManager, OverallStatus};
use crate::config::{Settings, SnapvaultPaths};
use crate::display::format_status_report;
use crate::error::SnapvaultResult;

/// Handle the status command
///
/// Returns whether every destination is present and readable, so cron
/// jobs can alert on a degraded backup set from the exit code alone.
pub fn handle_status_command(
    paths: &SnapvaultPaths,
    settings: &Settings,
) -> SnapvaultResult<bool> {
    let manager = BackupManager::new(settings.clone(), paths);
    let report = manager.backup_status();
    print!("{}", format_status_report(&report));

    Ok(report.overall == OverallStatus::Good)
}
