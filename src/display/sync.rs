//! Sync report formatting
//!
//! Formats the result of an incremental sync for terminal output.

use crate::backup::{DestinationSyncResult, SyncReport};

use super::format::{format_duration, format_size};
use super::verify::format_verification_summary;

/// Format a full sync report with per-destination breakdowns
pub fn format_sync_report(report: &SyncReport) -> String {
    let mut output = String::new();

    output.push_str("Sync Report\n");
    output.push_str("===========\n");
    if report.dry_run {
        output.push_str("Mode: dry run (no files were written)\n");
    }
    output.push_str(&format!("Source: {}\n", report.source.display()));
    output.push_str(&format!("Files scanned: {}\n", report.files_scanned));
    output.push('\n');

    for result in &report.destinations {
        output.push_str(&format_destination_result(result));
        output.push('\n');
    }

    for verification in &report.verifications {
        output.push_str(&format_verification_summary(verification));
        output.push('\n');
    }

    output.push_str(&format!(
        "Totals: {} copied, {} updated, {} deleted, {} unchanged\n",
        report.total_copied(),
        report.total_updated(),
        report.total_deleted(),
        report.total_skipped(),
    ));
    output.push_str(&format!(
        "Data written: {}\n",
        format_size(report.total_bytes_copied())
    ));
    if report.total_errors() > 0 {
        output.push_str(&format!("Errors: {}\n", report.total_errors()));
    }
    if report.cancelled {
        output.push_str("Sync was cancelled before it finished.\n");
    }
    output.push_str(&format!(
        "Completed in {}\n",
        format_duration(report.duration)
    ));

    output
}

/// Format one destination's sync outcome
fn format_destination_result(result: &DestinationSyncResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", result.destination.display()));
    output.push_str(&format!("  Copied:    {}\n", result.copied));
    output.push_str(&format!("  Updated:   {}\n", result.updated));
    output.push_str(&format!("  Deleted:   {}\n", result.deleted));
    output.push_str(&format!("  Unchanged: {}\n", result.skipped));
    if result.bytes_copied > 0 {
        output.push_str(&format!(
            "  Written:   {}\n",
            format_size(result.bytes_copied)
        ));
    }
    for error in &result.errors {
        output.push_str(&format!("  ! {}\n", error));
    }
    if result.cancelled {
        output.push_str("  (cancelled)\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn sample_report() -> SyncReport {
        SyncReport {
            source: PathBuf::from("/library"),
            dry_run: false,
            files_scanned: 120,
            destinations: vec![DestinationSyncResult {
                destination: PathBuf::from("/mnt/backup"),
                copied: 5,
                updated: 2,
                skipped: 113,
                deleted: 1,
                bytes_copied: 2048,
                errors: vec!["Failed to copy photo.jpg: permission denied".to_string()],
                cancelled: false,
            }],
            verifications: Vec::new(),
            duration: Duration::from_secs(3),
            cancelled: false,
        }
    }

    #[test]
    fn test_format_sync_report() {
        let output = format_sync_report(&sample_report());

        assert!(output.contains("Sync Report"));
        assert!(output.contains("/mnt/backup"));
        assert!(output.contains("Copied:    5"));
        assert!(output.contains("5 copied, 2 updated, 1 deleted, 113 unchanged"));
        assert!(output.contains("2.0 KB"));
        assert!(output.contains("permission denied"));
        assert!(!output.contains("dry run"));
    }

    #[test]
    fn test_dry_run_is_called_out() {
        let mut report = sample_report();
        report.dry_run = true;

        let output = format_sync_report(&report);
        assert!(output.contains("dry run"));
    }
}
