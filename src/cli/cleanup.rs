//! Cleanup CLI command
//!
//! Applies the retention window to backup destinations.

use clap::Args;
use std::path::PathBuf;

use crate::backup::BackupManager;
use crate::config::{Settings, SnapvaultPaths};
use crate::display::format_cleanup_report;
use crate::error::SnapvaultResult;

/// Arguments for `snapvault cleanup`
#[derive(Args, Debug)]
pub struct CleanupArgs {
    /// Destination directories (defaults to the configured destinations)
    pub destinations: Vec<PathBuf>,

    /// Remove backup files older than this many days (defaults to the
    /// configured retention window)
    #[arg(long, value_name = "N")]
    pub keep_days: Option<u32>,

    /// Plan the cleanup without deleting anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Handle the cleanup command
///
/// Returns whether the cleanup finished with no per-file errors.
pub fn handle_cleanup_command(
    paths: &SnapvaultPaths,
    settings: &Settings,
    args: &CleanupArgs,
) -> SnapvaultResult<bool> {
    let mut settings = settings.clone();
    if !args.destinations.is_empty() {
        settings.backup.destinations = args.destinations.clone();
    }
    let dry_run = args.dry_run || settings.general.dry_run;

    let manager = BackupManager::new(settings, paths);
    let keep_days = args
        .keep_days
        .unwrap_or(manager.settings().backup.keep_days);
    let report = manager.cleanup_old_backups(keep_days, dry_run)?;
    print!("{}", format_cleanup_report(&report));

    Ok(report.total_errors() == 0 && !report.cancelled)
}
