//! Error handling for selfup
//!
//! This module provides the error taxonomy of the update pipeline and the
//! user-facing wrapper the CLI renders. The error system follows two rules:
//! 1. **Strongly-typed errors** so callers can decide whether to retry, abort,
//!    or point the user at another update channel
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`UpdateError`] - one variant per way a pipeline stage can fail
//! - [`ErrorContext`] - wrapper that adds suggestions and details for display
//!
//! "No asset for this platform" is deliberately *not* an error: the asset
//! matcher returns `None` and the pipeline reports `update_available = false`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use selfup::core::{ErrorContext, UpdateError};
//!
//! let error = UpdateError::FeedRejected {
//!     feed: "acme/tool".to_string(),
//!     status: 403,
//! };
//! assert!(error.is_retryable());
//!
//! ErrorContext::new(error)
//!     .with_suggestion("Wait for the GitHub rate limit to reset")
//!     .display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::upgrade::UpdateOutcome;
use crate::utils::platform::Platform;

/// Failure of one stage of the update pipeline.
///
/// Every variant names the stage it came from (see [`UpdateError::stage`]) and
/// carries the underlying cause as text. The core never retries and never logs
/// and swallows one of these; they go straight back to the caller.
///
/// Failures that happen after the download completed carry the partial
/// [`UpdateOutcome`] (`downloaded = true, installed = false`) so callers can
/// tell the user the installation may be half-applied.
#[derive(Error, Debug, Clone)]
pub enum UpdateError {
    /// The capability gate refused: this platform cannot rewrite its own
    /// installation and must use a store or package channel.
    #[error("Self-update is not supported on this platform ({platform})")]
    UnsupportedPlatform {
        /// The platform that was refused
        platform: Platform,
    },

    /// A release feed identity could not be parsed.
    #[error("Invalid release feed '{input}': {reason}")]
    InvalidFeed {
        /// The text that was supplied
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// The release feed could not be reached (DNS, TLS, connection, timeout).
    #[error("Release feed {feed} is unreachable: {reason}")]
    FeedUnreachable {
        /// Feed identity (`owner/repo`)
        feed: String,
        /// Transport error text
        reason: String,
    },

    /// The feed answered with a non-success status.
    #[error("Release feed {feed} rejected the request with HTTP {status}")]
    FeedRejected {
        /// Feed identity (`owner/repo`)
        feed: String,
        /// HTTP status code
        status: u16,
    },

    /// The feed answered 2xx but the body is not a release document.
    #[error("Release feed {feed} returned a malformed response: {reason}")]
    FeedMalformed {
        /// Feed identity (`owner/repo`)
        feed: String,
        /// Decoder error text
        reason: String,
    },

    /// Fetching the selected asset failed, or it could not be written to the
    /// temporary file.
    #[error("Failed to download {asset}: {reason}")]
    DownloadFailed {
        /// Asset file name
        asset: String,
        /// Transport, status, or I/O error text
        reason: String,
    },

    /// The directory containing the running executable could not be resolved.
    #[error("Cannot locate the installation directory: {reason}")]
    InstallDirUnavailable {
        /// Underlying error text
        reason: String,
        /// State reached before the failure
        outcome: Box<UpdateOutcome>,
    },

    /// The native unpack tool failed. Files may already have been overwritten.
    #[error("Failed to extract update with {tool}: {reason}")]
    ExtractFailed {
        /// Unpack tool that was run
        tool: String,
        /// Exit status and stderr, or spawn error
        reason: String,
        /// State reached before the failure
        outcome: Box<UpdateOutcome>,
    },

    /// Host configuration could not be loaded.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// Anything else, used when rendering foreign errors.
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

impl UpdateError {
    /// Pipeline stage the error came from.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::UnsupportedPlatform { .. } => "gate",
            Self::InvalidFeed { .. }
            | Self::FeedUnreachable { .. }
            | Self::FeedRejected { .. }
            | Self::FeedMalformed { .. } => "resolve",
            Self::DownloadFailed { .. } => "download",
            Self::InstallDirUnavailable { .. } => "install",
            Self::ExtractFailed { .. } => "extract",
            Self::ConfigError { .. } | Self::Other { .. } => "host",
        }
    }

    /// Whether trying again later can reasonably succeed.
    ///
    /// Malformed feeds need a code update, and an unsupported platform never
    /// changes, so neither is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::FeedUnreachable { .. } | Self::FeedRejected { .. } | Self::DownloadFailed { .. }
        )
    }

    /// Outcome reached before a post-download failure.
    #[must_use]
    pub fn partial_outcome(&self) -> Option<&UpdateOutcome> {
        match self {
            Self::InstallDirUnavailable { outcome, .. } | Self::ExtractFailed { outcome, .. } => {
                Some(outcome)
            }
            _ => None,
        }
    }
}

/// Error wrapper with a suggestion and details for terminal display.
///
/// Created by [`crate::core::user_friendly_error`] at the CLI boundary; library
/// code returns plain [`UpdateError`]s.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: UpdateError,
    /// What the user can do about it
    pub suggestion: Option<String>,
    /// Additional explanation
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap an error with no suggestion or details.
    #[must_use]
    pub const fn new(error: UpdateError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Attach a suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}
