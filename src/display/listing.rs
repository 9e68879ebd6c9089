//! Backup listing formatting
//!
//! Renders backup inventories and the restore-candidate ranking.

use crate::backup::{BackupListing, RestoreCandidates};

use super::format::{format_age, format_size, format_timestamp};

/// Format one backup's contents
pub fn format_backup_listing(listing: &BackupListing) -> String {
    let mut output = String::new();

    output.push_str(&format!("Backup: {}\n", listing.root.display()));

    if !listing.exists {
        output.push_str("  Not found.\n");
        return output;
    }
    if !listing.errors.is_empty() {
        for error in &listing.errors {
            output.push_str(&format!("  ! {}\n", error));
        }
        return output;
    }
    if listing.total_files == 0 {
        output.push_str("  Empty.\n");
        return output;
    }

    output.push_str(&format!(
        "  {} files, {}\n",
        listing.total_files,
        format_size(listing.total_size)
    ));
    if let Some(modified) = listing.last_modified {
        output.push_str(&format!(
            "  Last modified: {} ({})\n",
            format_timestamp(modified),
            format_age(modified)
        ));
    }

    if !listing.files.is_empty() {
        output.push('\n');
        for file in &listing.files {
            output.push_str(&format!(
                "  {:>10}  {}  {}\n",
                format_size(file.size),
                format_timestamp(file.modified),
                file.path.display(),
            ));
        }
    }

    output
}

/// Format the ranked restore candidates
pub fn format_restore_candidates(candidates: &RestoreCandidates) -> String {
    let mut output = String::new();

    output.push_str("Restore Candidates\n");
    output.push_str("==================\n");

    if candidates.available.is_empty() && candidates.unavailable.is_empty() {
        output.push_str("No backup destinations configured.\n");
        return output;
    }

    if candidates.available.is_empty() {
        output.push_str("No usable backups found.\n");
    } else {
        for (i, listing) in candidates.available.iter().enumerate() {
            let marker = if i == 0 { " (recommended)" } else { "" };
            let freshness = listing
                .last_modified
                .map(format_age)
                .unwrap_or_else(|| "unknown age".to_string());
            output.push_str(&format!(
                "  {}. {} - {} files, {}, {}{}\n",
                i + 1,
                listing.root.display(),
                listing.total_files,
                format_size(listing.total_size),
                freshness,
                marker,
            ));
        }
    }

    if !candidates.unavailable.is_empty() {
        output.push('\n');
        output.push_str("Unavailable:\n");
        for listing in &candidates.unavailable {
            let reason = if !listing.exists { "not found" } else { "empty" };
            output.push_str(&format!(
                "  - {} ({})\n",
                listing.root.display(),
                reason
            ));
        }
    }

    output
}
