//! `selfup platform`: report the platform identity and whether in-place
//! updates are possible here.
//!
//! Other tools call this as the narrow "is self-update supported" interface,
//! so it always exits 0 and the answer is in the output.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use serde::Serialize;

use super::upgrade::OutputFormat;
use crate::utils::platform::Platform;

/// Command-line arguments for `selfup platform`.
#[derive(Parser, Debug, Default)]
pub struct PlatformArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// What `selfup platform` prints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformReport {
    /// Platform family, `unsupported` for sandboxed or mobile targets
    pub platform: Platform,
    /// OS name reported by the standard library
    pub os: &'static str,
    /// CPU architecture reported by the standard library
    pub arch: &'static str,
    /// Whether in-place self-update is allowed
    pub self_update_supported: bool,
}

impl PlatformReport {
    /// Report for `platform` on this host.
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            self_update_supported: platform.can_self_update(),
        }
    }

    /// Colored two-line summary.
    pub fn render_text(&self) -> String {
        let supported = if self.self_update_supported {
            "supported".green()
        } else {
            "not supported (use your platform's store or package manager)".yellow()
        };
        format!(
            "Platform:    {} ({}/{})\nSelf-update: {}",
            self.platform, self.os, self.arch, supported
        )
    }
}

/// Execute `selfup platform`.
///
/// # Errors
///
/// Fails only if JSON serialization fails.
pub fn execute(args: &PlatformArgs) -> Result<()> {
    let report = PlatformReport::for_platform(Platform::current());
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => println!("{}", report.render_text()),
    }
    Ok(())
}
