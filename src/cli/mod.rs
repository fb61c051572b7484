//! Command-line interface for selfup.
//!
//! # Available Commands
//!
//! - `upgrade` - check the release feed and install the latest release
//! - `platform` - report the platform and whether self-update is supported
//!
//! # Global Options
//!
//! - `--verbose` - debug logging
//! - `--quiet` - errors only
//! - `--no-progress` - hide spinners (also `SELFUP_NO_PROGRESS`)
//! - `--config <PATH>` - config file (also `SELFUP_CONFIG`)
//!
//! ```bash
//! selfup upgrade --check
//! selfup --verbose upgrade --repo acme/tool --asset-prefix tool
//! selfup platform --format json
//! ```
//!
//! # Logging
//!
//! Logs go to stderr through `tracing`. `RUST_LOG` takes precedence over the
//! verbosity flags when set.

pub mod platform;
pub mod upgrade;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::constants::NO_PROGRESS_ENV_VAR;

/// Process-level settings derived from the global flags.
///
/// Built by [`Cli::build_config`] and applied once before any command runs,
/// so tests can construct one directly instead of going through argument
/// parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// `tracing` filter used when `RUST_LOG` is not set
    pub log_level: String,
    /// Hide progress indicators
    pub no_progress: bool,
    /// Explicit config file path
    pub config_path: Option<String>,
}

impl CliConfig {
    /// Set process-wide state: progress switch and logging subscriber.
    ///
    /// Call once, from the main thread, before spawning work.
    pub fn apply(&self) {
        if self.no_progress {
            // SAFETY: called once from main before any other thread reads the
            // environment.
            unsafe {
                std::env::set_var(NO_PROGRESS_ENV_VAR, "1");
            }
        }
        init_logging(&self.log_level);
    }
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Self-updating command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "selfup",
    version,
    about = "Check for and install updates of this tool from its GitHub releases"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the config file.
    ///
    /// Falls back to `SELFUP_CONFIG`, then `~/.selfup/config.toml`. `~` is
    /// expanded.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Disable spinners.
    #[arg(long, global = true)]
    no_progress: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check for a newer release and install it
    Upgrade(upgrade::UpgradeArgs),

    /// Show the platform and whether self-update is supported on it
    Platform(platform::PlatformArgs),
}

impl Cli {
    /// Apply global settings and run the selected command.
    ///
    /// # Errors
    ///
    /// Returns whatever the command returns; `main` renders it.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
            no_progress: self.no_progress,
            config_path: self.config.clone(),
        }
    }

    /// Run with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns whatever the command returns.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.apply();

        match self.command {
            Commands::Upgrade(args) => upgrade::execute(args, config.config_path.as_deref()).await,
            Commands::Platform(args) => platform::execute(&args),
        }
    }
}
