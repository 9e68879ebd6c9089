//! Restore CLI command
//!
//! Copies files out of a backup and back into a library tree.

use clap::Args;
use std::path::PathBuf;

use crate::backup::{BackupManager, RestoreOptions};
use crate::config::{Settings, SnapvaultPaths};
use crate::display::{format_restore_candidates, format_restore_report};
use crate::error::SnapvaultResult;

/// Arguments for `snapvault restore`
#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Directory to restore into
    pub target: PathBuf,

    /// Backup directory to restore from (defaults to the freshest usable
    /// backup among the configured destinations)
    #[arg(long, value_name = "DIR")]
    pub from: Option<PathBuf>,

    /// Restore only files whose path contains one of these patterns
    #[arg(long = "pattern", value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// Put every file directly in the target root instead of rebuilding
    /// the backup's directory structure
    #[arg(long)]
    pub flatten: bool,

    /// Leave target files alone when they are newer than the backup copy
    #[arg(long)]
    pub skip_newer: bool,

    /// Plan the restore without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Handle the restore command
///
/// Returns whether the restore finished with no per-file errors.
pub fn handle_restore_command(
    paths: &SnapvaultPaths,
    settings: &Settings,
    args: &RestoreArgs,
) -> SnapvaultResult<bool> {
    let dry_run = args.dry_run || settings.general.dry_run;
    let manager = BackupManager::new(settings.clone(), paths);

    let backup_root = match &args.from {
        Some(path) => path.clone(),
        None => {
            let candidates = manager.restore_candidates();
            match candidates.recommended.clone() {
                Some(root) => {
                    println!("Restoring from {}", root.display());
                    println!();
                    root
                }
                None => {
                    println!("No usable backup found to restore from.");
                    println!();
                    print!("{}", format_restore_candidates(&candidates));
                    return Ok(false);
                }
            }
        }
    };

    let options = RestoreOptions {
        patterns: args.patterns.clone(),
        preserve_structure: !args.flatten,
        overwrite_newer: !args.skip_newer,
        dry_run,
    };

    let report = manager.restore_from_backup(&backup_root, &args.target, &options);
    print!("{}", format_restore_report(&report));

    Ok(report.success())
}
