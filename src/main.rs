//! selfup CLI entry point
//!
//! Parses arguments, runs the command, and renders failures with a
//! suggestion before exiting with status 1.
//!
//! - `upgrade` - check for and install the latest release
//! - `platform` - report whether self-update is supported here

use anyhow::Result;
use clap::Parser;
use selfup::cli;
use selfup::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
