//! Display formatting for terminal output
//!
//! Turns the backup engine's report types into strings for the CLI to
//! print. Rendering stays out of the engine so reports can be tested
//! and reused without touching stdout.

pub mod format;
pub mod listing;
pub mod maintenance;
pub mod status;
pub mod sync;
pub mod verify;

pub use format::{format_age, format_duration, format_size, format_timestamp};
pub use listing::{format_backup_listing, format_restore_candidates};
pub use maintenance::{format_cleanup_report, format_restore_report};
pub use status::format_status_report;
pub use sync::format_sync_report;
pub use verify::{format_verification_report, format_verification_summary};
