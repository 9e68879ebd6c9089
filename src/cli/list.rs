//! List CLI command
//!
//! Shows what a backup holds, or ranks all configured destinations.

use clap::Args;
use std::path::PathBuf;

use crate::backup::BackupManager;
use crate::config::{Settings, SnapvaultPaths};
use crate::display::{format_backup_listing, format_restore_candidates};
use crate::error::SnapvaultResult;

/// Arguments for `snapvault list`
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Backup directory to list (defaults to a summary of every
    /// configured destination)
    pub backup: Option<PathBuf>,

    /// Show every file instead of a summary
    #[arg(long)]
    pub details: bool,
}

/// Handle the list command
pub fn handle_list_command(
    paths: &SnapvaultPaths,
    settings: &Settings,
    args: &ListArgs,
) -> SnapvaultResult<bool> {
    let manager = BackupManager::new(settings.clone(), paths);

    match &args.backup {
        Some(root) => {
            let listing = manager.list_backup_contents(root, args.details);
            print!("{}", format_backup_listing(&listing));
            Ok(listing.errors.is_empty())
        }
        None => {
            let candidates = manager.restore_candidates();
            print!("{}", format_restore_candidates(&candidates));
            Ok(true)
        }
    }
}
