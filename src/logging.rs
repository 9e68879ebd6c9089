//! Logging setup for the snapvault binary.
//!
//! Installs a global tracing subscriber writing to stderr, filtered by
//! `SNAPVAULT_LOG` (falling back to `RUST_LOG`, then to a default level).
//! Library code only emits events; nothing in the core requires the
//! subscriber to exist, so tests run without any global setup.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize tracing output for the CLI.
///
/// `verbose` lowers the default filter from `info` to `debug`; an explicit
/// `SNAPVAULT_LOG`/`RUST_LOG` environment filter always wins. Subsequent
/// calls are no-ops.
pub fn init(verbose: bool) {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("SNAPVAULT_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
            .and_then(|spec| spec.parse::<EnvFilter>().ok())
            .unwrap_or_else(|| default_filter(verbose));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}
