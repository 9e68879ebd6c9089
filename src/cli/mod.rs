//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the backup engine.
//!
//! Every handler returns `Ok(bool)`: `true` when the operation finished
//! cleanly, `false` when it finished with problems worth a nonzero exit
//! code. Setup failures (missing source, no destinations, unreadable
//! config) surface as `Err` instead.

pub mod cleanup;
pub mod list;
pub mod restore;
pub mod status;
pub mod sync;
pub mod verify;

pub use cleanup::{handle_cleanup_command, CleanupArgs};
pub use list::{handle_list_command, ListArgs};
pub use restore::{handle_restore_command, RestoreArgs};
pub use status::handle_status_command;
pub use sync::{handle_sync_command, SyncArgs};
pub use verify::{handle_verify_command, VerifyArgs};
