//! Sync CLI command
//!
//! Mirrors the library into every backup destination.

use clap::Args;
use std::path::PathBuf;

use crate::backup::BackupManager;
use crate::config::{Settings, SnapvaultPaths};
use crate::display::format_sync_report;
use crate::error::SnapvaultResult;

/// Arguments for `snapvault sync`
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Destination directories (defaults to the configured destinations)
    pub destinations: Vec<PathBuf>,

    /// Plan the sync and report what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the verification pass that normally follows a sync
    #[arg(long)]
    pub no_verify: bool,
}

/// Handle the sync command
///
/// Returns whether the sync finished with no per-file errors.
pub fn handle_sync_command(
    paths: &SnapvaultPaths,
    settings: &Settings,
    args: &SyncArgs,
) -> SnapvaultResult<bool> {
    let mut settings = settings.clone();
    if !args.destinations.is_empty() {
        settings.backup.destinations = args.destinations.clone();
    }
    if args.no_verify {
        settings.backup.enable_verification = false;
    }
    let dry_run = args.dry_run || settings.general.dry_run;

    let manager = BackupManager::new(settings, paths);
    let report = manager.incremental_sync(dry_run)?;
    print!("{}", format_sync_report(&report));

    Ok(report.success())
}
