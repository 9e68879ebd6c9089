//! Verification report formatting
//!
//! Formats integrity check results, both the one-line summary embedded
//! in sync output and the full breakdown shown by the verify command.

use crate::backup::{VerificationReport, VerifyMode};

use super::format::{format_duration, format_score};

/// One line per destination, used after a sync
pub fn format_verification_summary(report: &VerificationReport) -> String {
    format!(
        "Verified {}: {} ({}/{} files)\n",
        report.destination.display(),
        format_score(report.integrity_score()),
        report.verified_files,
        report.expected_files,
    )
}

/// Full verification breakdown for one destination
pub fn format_verification_report(report: &VerificationReport) -> String {
    let mut output = String::new();

    let mode = match report.mode {
        VerifyMode::Quick => "quick (size and mtime)",
        VerifyMode::Full => "full (checksums)",
    };

    output.push_str(&format!("{}\n", report.destination.display()));
    output.push_str(&format!("  Mode: {}\n", mode));
    output.push_str(&format!(
        "  Integrity: {} ({} of {} files verified)\n",
        format_score(report.integrity_score()),
        report.verified_files,
        report.expected_files,
    ));

    if !report.missing_files.is_empty() {
        output.push_str(&format!("  Missing: {}\n", report.missing_files.len()));
        for path in report.missing_files.iter().take(10) {
            output.push_str(&format!("    - {}\n", path.display()));
        }
        if report.missing_files.len() > 10 {
            output.push_str(&format!(
                "    ... and {} more\n",
                report.missing_files.len() - 10
            ));
        }
    }

    if !report.corrupted_files.is_empty() {
        output.push_str(&format!("  Corrupted: {}\n", report.corrupted_files.len()));
        for path in report.corrupted_files.iter().take(10) {
            output.push_str(&format!("    - {}\n", path.display()));
        }
        if report.corrupted_files.len() > 10 {
            output.push_str(&format!(
                "    ... and {} more\n",
                report.corrupted_files.len() - 10
            ));
        }
    }

    if !report.extra_files.is_empty() {
        output.push_str(&format!(
            "  Extra files not in source: {}\n",
            report.extra_files.len()
        ));
    }

    for error in &report.errors {
        output.push_str(&format!("  ! {}\n", error));
    }

    if report.cancelled {
        output.push_str("  (cancelled)\n");
    }
    output.push_str(&format!(
        "  Checked in {}\n",
        format_duration(report.duration)
    ));

    output
}
