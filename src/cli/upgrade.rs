use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use tracing::{debug, warn};

use crate::config::{GlobalConfig, UpdateSettings};
use crate::core::UpdateError;
use crate::upgrade::{
    ArchiveUnpacker, HttpTransport, NativeUnpacker, ReqwestTransport, SelfUpdater, UpdateOutcome,
    UpdateTarget,
};
use crate::utils::platform::Platform;
use crate::utils::progress::Spinner;

/// How command results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable summary
    #[default]
    Text,
    /// A single JSON object on stdout
    Json,
}

/// Command-line arguments for `selfup upgrade`.
///
/// Without flags, checks the release feed and installs the latest release if
/// it differs from the running version and has an asset for this platform.
///
/// # Examples
///
/// ```bash
/// selfup upgrade --check                      # report only
/// selfup upgrade                              # check and install
/// selfup upgrade --force                      # reinstall the latest release
/// selfup upgrade --check --format json        # machine-readable outcome
/// selfup upgrade --repo acme/tool --asset-prefix tool
/// ```
///
/// `--repo`, `--asset-prefix` and `--api-url` override the `[update]` table of
/// the config file.
#[derive(Parser, Debug, Default)]
pub struct UpgradeArgs {
    /// Check for updates without installing.
    ///
    /// Exits 0 whether or not an update exists.
    #[arg(long)]
    pub check: bool,

    /// Install the latest release even if it matches the running version.
    #[arg(short, long)]
    pub force: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Release feed as `owner/repo`.
    #[arg(long, value_name = "OWNER/REPO")]
    pub repo: Option<String>,

    /// Product part of release asset names (`<prefix>-<platform>...`).
    #[arg(long, value_name = "PREFIX")]
    pub asset_prefix: Option<String>,

    /// GitHub API root, e.g. for GitHub Enterprise.
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,
}

impl UpgradeArgs {
    /// Apply command-line overrides on top of the config file settings.
    pub fn apply(&self, mut settings: UpdateSettings) -> UpdateSettings {
        if let Some(repo) = &self.repo {
            settings.repository.clone_from(repo);
        }
        if let Some(prefix) = &self.asset_prefix {
            settings.asset_prefix.clone_from(prefix);
        }
        if let Some(url) = &self.api_url {
            settings.api_url.clone_from(url);
        }
        settings
    }
}

/// Execute `selfup upgrade`.
///
/// # Errors
///
/// Fails if the config cannot be loaded, the feed identity is invalid, or
/// any pipeline stage fails. Errors keep their [`UpdateError`] so `main` can
/// render a targeted suggestion.
pub async fn execute(args: UpgradeArgs, config_path: Option<&str>) -> Result<()> {
    let config = GlobalConfig::load(config_path).await?;
    let settings = args.apply(config.update);
    debug!(
        "Update settings: repository={}, asset_prefix={}",
        settings.repository, settings.asset_prefix
    );

    let target = settings.target()?;
    let transport = ReqwestTransport::builder()
        .timeout(settings.timeout())
        .download_timeout(settings.download_timeout())
        .token(settings.token.clone())
        .build()
        .context("Failed to initialize HTTP client")?;

    let updater = SelfUpdater::new(transport, NativeUnpacker::current())
        .force(args.force)
        .with_api_base(&settings.api_url);

    run(&updater, &target, args.check, args.format).await
}

/// Run a check or update and print the result.
///
/// # Errors
///
/// Returns the pipeline error unchanged. In JSON mode a partial outcome
/// carried by the error is printed first.
pub async fn run<T: HttpTransport, U: ArchiveUnpacker>(
    updater: &SelfUpdater<T, U>,
    target: &UpdateTarget,
    check_only: bool,
    format: OutputFormat,
) -> Result<()> {
    let spinner = if format == OutputFormat::Text {
        let msg = if check_only {
            format!("Checking {} for updates...", target.feed)
        } else {
            format!("Updating from {}...", target.feed)
        };
        Some(Spinner::new(msg))
    } else {
        None
    };

    let result = if check_only {
        updater.check(target).await
    } else {
        updater.update(target).await
    };

    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }

    match result {
        Ok(outcome) => {
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
                OutputFormat::Text => println!(
                    "{}",
                    render_text(&outcome, updater.current_version(), updater.platform(), check_only)
                ),
            }
            Ok(())
        }
        Err(err) => {
            if let Some(outcome) = err.partial_outcome() {
                warn!("Update stopped after download: {}", outcome);
                if format == OutputFormat::Json {
                    println!("{}", serde_json::to_string_pretty(outcome)?);
                }
            }
            Err(upgrade_failure(err, check_only))
        }
    }
}

fn upgrade_failure(err: UpdateError, check_only: bool) -> anyhow::Error {
    let what = if check_only {
        "Failed to check for updates"
    } else {
        "Upgrade failed"
    };
    anyhow::Error::from(err).context(what)
}

/// Human-readable summary of an outcome.
pub fn render_text(
    outcome: &UpdateOutcome,
    current_version: &str,
    platform: Platform,
    check_only: bool,
) -> String {
    let latest = outcome.latest_version();

    if outcome.installed() {
        return format!(
            "Upgraded {current_version} -> {latest} from {}",
            outcome.asset_name().unwrap_or_default()
        )
        .green()
        .to_string();
    }

    if outcome.update_available() {
        let asset = outcome.asset_name().unwrap_or_default();
        let mut text =
            format!("Update available: {current_version} -> {latest} ({asset})").green().to_string();
        if check_only {
            text.push_str("\nRun `selfup upgrade` to install it");
        }
        return text;
    }

    match outcome.asset_name() {
        None => format!("Release {latest} has no build for {platform}; nothing to install")
            .yellow()
            .to_string(),
        Some(_) => format!("You are on the latest version ({current_version})").green().to_string(),
    }
}
