//! Verify CLI command
//!
//! Checks that backups faithfully mirror the library.

use clap::Args;
use std::path::PathBuf;

use crate::backup::{BackupManager, VerifyMode};
use crate::config::{Settings, SnapvaultPaths};
use crate::display::format_verification_report;
use crate::error::SnapvaultResult;

/// Arguments for `snapvault verify`
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Destination directories (defaults to the configured destinations)
    pub destinations: Vec<PathBuf>,

    /// Compare size and modification time only, skipping checksums
    #[arg(long)]
    pub quick: bool,
}

/// Handle the verify command
///
/// Returns whether every destination verified intact.
pub fn handle_verify_command(
    paths: &SnapvaultPaths,
    settings: &Settings,
    args: &VerifyArgs,
) -> SnapvaultResult<bool> {
    let mut settings = settings.clone();
    if !args.destinations.is_empty() {
        settings.backup.destinations = args.destinations.clone();
    }

    let mode = if args.quick {
        VerifyMode::Quick
    } else {
        VerifyMode::Full
    };

    let manager = BackupManager::new(settings, paths);
    let reports = manager.verify_backups(mode)?;

    println!("Verification Report");
    println!("===================");
    println!();
    for report in &reports {
        print!("{}", format_verification_report(report));
        println!();
    }

    let intact = reports.iter().all(|r| r.is_intact());
    if intact {
        println!("All backups verified.");
    } else {
        println!("Problems found. Run 'snapvault sync' to repair the affected backups.");
    }

    Ok(intact)
}
