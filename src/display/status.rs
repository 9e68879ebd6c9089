//! Status report formatting
//!
//! Renders the backup health overview as a table plus recommendations.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::backup::{DestinationState, StatusReport};

use super::format::{format_size, format_timestamp};

#[derive(Tabled)]
struct DestinationRow {
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Files")]
    files: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Last Modified")]
    last_modified: String,
}

/// Format the full status overview
pub fn format_status_report(report: &StatusReport) -> String {
    let mut output = String::new();

    output.push_str("Backup Status\n");
    output.push_str("=============\n");
    output.push_str(&format!(
        "Source: {}{}\n",
        report.source.display(),
        if report.source_exists { "" } else { " (missing)" }
    ));
    output.push('\n');

    if !report.destinations.is_empty() {
        let rows: Vec<DestinationRow> = report
            .destinations
            .iter()
            .map(|status| {
                let present = status.state == DestinationState::Ok;
                DestinationRow {
                    destination: status.path.display().to_string(),
                    state: status.state.to_string(),
                    files: if present {
                        status.file_count.to_string()
                    } else {
                        "-".to_string()
                    },
                    size: if present {
                        format_size(status.total_size)
                    } else {
                        "-".to_string()
                    },
                    last_modified: status
                        .last_modified
                        .map(format_timestamp)
                        .unwrap_or_else(|| "-".to_string()),
                }
            })
            .collect();

        let mut table = Table::new(rows);
        table.with(Style::psql());
        output.push_str(&table.to_string());
        output.push('\n');

        for status in &report.destinations {
            if let Some(error) = &status.error {
                output.push_str(&format!("! {}: {}\n", status.path.display(), error));
            }
        }
        output.push('\n');
    }

    output.push_str(&format!("Overall: {}\n", report.overall));
    if !report.recommendations.is_empty() {
        output.push_str("Recommendations:\n");
        for recommendation in &report.recommendations {
            output.push_str(&format!("  - {}\n", recommendation));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::{DestinationStatus, OverallStatus};
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn sample_report() -> StatusReport {
        StatusReport {
            source: PathBuf::from("/library"),
            source_exists: true,
            overall: OverallStatus::Partial,
            destinations: vec![
                DestinationStatus {
                    path: PathBuf::from("/mnt/primary"),
                    state: DestinationState::Ok,
                    file_count: 1250,
                    total_size: 4 * 1024 * 1024,
                    last_modified: Some(SystemTime::now()),
                    error: None,
                },
                DestinationStatus {
                    path: PathBuf::from("/mnt/offsite"),
                    state: DestinationState::Missing,
                    file_count: 0,
                    total_size: 0,
                    last_modified: None,
                    error: None,
                },
            ],
            recommendations: vec!["Create backup directory: /mnt/offsite".to_string()],
        }
    }

    #[test]
    fn test_format_status_report() {
        let output = format_status_report(&sample_report());

        assert!(output.contains("Backup Status"));
        assert!(output.contains("/mnt/primary"));
        assert!(output.contains("1250"));
        assert!(output.contains("4.0 MB"));
        assert!(output.contains("missing"));
        assert!(output.contains("Overall: partial"));
        assert!(output.contains("Create backup directory"));
    }

    #[test]
    fn test_missing_source_is_flagged() {
        let mut report = sample_report();
        report.source_exists = false;
        report.destinations.clear();
        report.overall = OverallStatus::Error;

        let output = format_status_report(&report);
        assert!(output.contains("(missing)"));
        assert!(output.contains("Overall: error"));
    }
}
