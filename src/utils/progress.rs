//! Progress indicators for long-running network steps
//!
//! Thin wrapper over `indicatif` spinners with selfup styling. Spinners draw
//! to stderr so JSON on stdout stays clean.
//!
//! # Environment Variables
//!
//! - `SELFUP_NO_PROGRESS`: set to any value to hide all progress indicators
//!   (the `--no-progress` flag sets it)
//!
//! # Examples
//!
//! ```rust
//! use selfup::utils::progress::Spinner;
//!
//! let spinner = Spinner::new("Checking for updates...");
//! // fetch the release feed
//! spinner.finish_and_clear();
//! ```

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::time::Duration;

use crate::constants::NO_PROGRESS_ENV_VAR;

/// Whether progress indicators are turned off for this process.
pub fn is_progress_disabled() -> bool {
    std::env::var_os(NO_PROGRESS_ENV_VAR).is_some()
}

/// Spinner for work of unknown length.
///
/// Hidden (and every call a no-op) when progress is disabled.
#[derive(Clone)]
pub struct Spinner {
    inner: IndicatifBar,
}

impl Spinner {
    /// Start a spinner showing `msg`.
    pub fn new(msg: impl Into<String>) -> Self {
        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        bar.set_message(msg.into());
        Self {
            inner: bar,
        }
    }

    /// Stop and erase the spinner line.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
}
