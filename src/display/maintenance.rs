//! Restore and cleanup report formatting

use crate::backup::{CleanupReport, RestoreReport};

use super::format::{format_duration, format_size};

/// Format the outcome of a restore
pub fn format_restore_report(report: &RestoreReport) -> String {
    let mut output = String::new();

    output.push_str("Restore Report\n");
    output.push_str("==============\n");
    if report.dry_run {
        output.push_str("Mode: dry run (no files were written)\n");
    }
    output.push_str(&format!("From: {}\n", report.backup.display()));
    output.push_str(&format!("To:   {}\n", report.target.display()));
    output.push('\n');
    output.push_str(&format!(
        "Restored: {} files ({})\n",
        report.files_restored,
        format_size(report.bytes_restored)
    ));
    if report.files_skipped > 0 {
        output.push_str(&format!(
            "Skipped:  {} files (target copies are newer)\n",
            report.files_skipped
        ));
    }
    for error in &report.errors {
        output.push_str(&format!("! {}\n", error));
    }
    if report.cancelled {
        output.push_str("Restore was cancelled before it finished.\n");
    }
    output.push_str(&format!(
        "Completed in {}\n",
        format_duration(report.duration)
    ));

    output
}

/// Format the outcome of a retention cleanup
pub fn format_cleanup_report(report: &CleanupReport) -> String {
    let mut output = String::new();

    output.push_str("Cleanup Report\n");
    output.push_str("==============\n");
    if report.dry_run {
        output.push_str("Mode: dry run (nothing was deleted)\n");
    }
    output.push_str(&format!("Retention window: {} days\n", report.keep_days));
    output.push('\n');

    for dest in &report.destinations {
        output.push_str(&format!("{}\n", dest.destination.display()));
        output.push_str(&format!(
            "  Removed: {} files ({})\n",
            dest.files_deleted,
            format_size(dest.bytes_freed)
        ));
        output.push_str(&format!("  Kept:    {} files\n", dest.files_kept));
        if dest.trash_purged > 0 {
            output.push_str(&format!(
                "  Trash purged: {} files ({})\n",
                dest.trash_purged,
                format_size(dest.trash_bytes_freed)
            ));
        }
        for error in &dest.errors {
            output.push_str(&format!("  ! {}\n", error));
        }
        if dest.cancelled {
            output.push_str("  (cancelled)\n");
        }
    }

    output.push('\n');
    output.push_str(&format!(
        "Freed {} across {} destination(s)\n",
        format_size(report.total_bytes_freed()),
        report.destinations.len()
    ));
    if report.cancelled {
        output.push_str("Cleanup was cancelled before it finished.\n");
    }
    output.push_str(&format!(
        "Completed in {}\n",
        format_duration(report.duration)
    ));

    output
}
