use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use snapvault::cli::{
    handle_cleanup_command, handle_list_command, handle_restore_command, handle_status_command,
    handle_sync_command, handle_verify_command, CleanupArgs, ListArgs, RestoreArgs, SyncArgs,
    VerifyArgs,
};
use snapvault::config::{Settings, SettingsOverrides, SnapvaultPaths};

#[derive(Parser)]
#[command(
    name = "snapvault",
    version,
    about = "Incremental backup and verification for organized photo libraries",
    long_about = "snapvault mirrors an organized photo/video library into one or \
                  more backup destinations, copying only what changed. It can \
                  verify backups against the library with checksums, restore \
                  files back out, and prune backups past a retention window."
)]
struct Cli {
    /// Use an explicit config file instead of the user config
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the configured source directory
    #[arg(long, global = true, value_name = "DIR")]
    source: Option<PathBuf>,

    /// Verbose log output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror the library into every backup destination
    Sync(SyncArgs),

    /// Check that backups faithfully mirror the library
    Verify(VerifyArgs),

    /// Show the health of every backup destination
    Status,

    /// Copy files out of a backup and back into a library tree
    Restore(RestoreArgs),

    /// Remove backup files older than the retention window
    Cleanup(CleanupArgs),

    /// List backup contents
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show the effective configuration and paths
    Config {
        /// Write the effective configuration to the user config file
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = SnapvaultPaths::new()?;
    let mut settings = Settings::load(&paths, cli.config.as_deref())?;
    settings.apply_overrides(&SettingsOverrides {
        source: cli.source.clone(),
        dry_run: None,
        verbose: cli.verbose.then_some(true),
    });

    snapvault::logging::init(settings.general.verbose);

    let clean = match cli.command {
        Commands::Sync(args) => handle_sync_command(&paths, &settings, &args)?,
        Commands::Verify(args) => handle_verify_command(&paths, &settings, &args)?,
        Commands::Status => handle_status_command(&paths, &settings)?,
        Commands::Restore(args) => handle_restore_command(&paths, &settings, &args)?,
        Commands::Cleanup(args) => handle_cleanup_command(&paths, &settings, &args)?,
        Commands::List(args) => handle_list_command(&paths, &settings, &args)?,
        Commands::Config { save } => {
            if save {
                settings.save(&paths)?;
                println!("Configuration saved to {}", paths.config_file().display());
                println!();
            }
            print_config(&paths, &settings);
            true
        }
    };

    if !clean {
        std::process::exit(1);
    }
    Ok(())
}

fn print_config(paths: &SnapvaultPaths, settings: &Settings) {
    println!("snapvault Configuration");
    println!("=======================");
    println!("Config directory: {}", paths.base_dir().display());
    println!(
        "Config file:      {}{}",
        paths.config_file().display(),
        if paths.is_initialized() {
            ""
        } else {
            " (not written yet, run 'snapvault config --save')"
        }
    );
    println!(
        "Checksum cache:   {}",
        paths
            .checksum_cache_file(&settings.backup.checksum_cache)
            .display()
    );
    println!();
    println!("Settings:");
    println!(
        "  Source directory:   {}",
        settings.general.source_directory.display()
    );
    if settings.backup.destinations.is_empty() {
        println!("  Destinations:       (none configured)");
    } else {
        println!("  Destinations:");
        for destination in &settings.backup.destinations {
            println!("    - {}", destination.display());
        }
    }
    if !settings.backup.exclude_patterns.is_empty() {
        println!("  Exclude patterns:");
        for pattern in &settings.backup.exclude_patterns {
            println!("    - {}", pattern);
        }
    }
    println!("  Use trash:          {}", settings.backup.use_trash);
    println!(
        "  Checksum algorithm: {}",
        settings.backup.checksum_algorithm
    );
    println!(
        "  Verify after sync:  {}",
        settings.backup.enable_verification
    );
    println!("  Keep days:          {}", settings.backup.keep_days);
    println!("  Dry run default:    {}", settings.general.dry_run);
}
