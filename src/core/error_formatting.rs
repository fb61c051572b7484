//! Error formatting utilities for selfup
//!
//! Converts pipeline and host errors into clear, actionable messages for the
//! terminal.

use super::*;

/// Keywords that indicate network-related errors
const NETWORK_ERROR_KEYWORDS: &[&str] = &["network", "connection", "timeout", "dns"];

/// Keywords that indicate permission-related errors
const PERMISSION_ERROR_KEYWORDS: &[&str] = &["permission", "denied", "access"];

/// Convert any error into a user-friendly format with contextual suggestions
///
/// Walks the `anyhow` chain looking for an [`UpdateError`] first, so context
/// added with `.context(...)` in the CLI layer does not hide the stage that
/// failed. Falls back to I/O error kinds and then to keyword matching.
///
/// # Arguments
///
/// * `error` - The error to convert to a user-friendly format
///
/// # Returns
///
/// An [`ErrorContext`] with user-friendly messages and suggestions
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(update_error) = cause.downcast_ref::<UpdateError>() {
            return create_error_context(update_error);
        }
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(UpdateError::Other {
                message: io_error.to_string(),
            })
            .with_suggestion("Check file permissions and try running with appropriate privileges");
        }
        return ErrorContext::new(UpdateError::Other {
            message: format!("IO error: {io_error}"),
        })
        .with_suggestion("Check that the path exists and you have the necessary permissions");
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(UpdateError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the syntax of your config file - TOML format must be valid");
    }

    let error_msg = format!("{error:#}");

    if NETWORK_ERROR_KEYWORDS.iter().any(|&keyword| error_msg.contains(keyword)) {
        return ErrorContext::new(UpdateError::Other {
            message: error_msg,
        })
        .with_suggestion("Check your internet connection and try again")
        .with_details("A network operation failed. Please verify your connection and retry.");
    }

    if PERMISSION_ERROR_KEYWORDS.iter().any(|&keyword| error_msg.contains(keyword)) {
        return ErrorContext::new(UpdateError::Other {
            message: error_msg,
        })
        .with_suggestion("Check file permissions and try running with appropriate privileges")
        .with_details("Permission was denied for the requested operation.");
    }

    ErrorContext::new(UpdateError::Other {
        message: error_msg,
    })
    .with_suggestion("Check the error message above for more details")
}

/// Create a user-friendly error context from an [`UpdateError`]
pub fn create_error_context(error: &UpdateError) -> ErrorContext {
    let ctx = ErrorContext::new(error.clone());
    match error {
        UpdateError::UnsupportedPlatform {
            platform,
        } => ctx
            .with_suggestion("Update through your platform's app store or package manager instead")
            .with_details(format!(
                "In-place updates are only available on macOS, Linux and Windows (this build targets {platform})"
            )),
        UpdateError::InvalidFeed {
            ..
        } => ctx.with_suggestion("Use the form 'owner/repo', e.g. --repo acme/tool"),
        UpdateError::FeedUnreachable {
            ..
        } => ctx
            .with_suggestion("Check your internet connection and try again")
            .with_details("The release feed could not be contacted"),
        UpdateError::FeedRejected {
            status,
            ..
        } => {
            let suggestion = match status {
                401 | 403 => "You may be rate limited; wait a while or configure an API token",
                404 => "Check the repository name and that it has at least one published release",
                _ => "Try again later",
            };
            ctx.with_suggestion(suggestion)
        }
        UpdateError::FeedMalformed {
            ..
        } => ctx
            .with_suggestion("Upgrade manually from the releases page; the feed format may have changed")
            .with_details("The response did not contain a release tag and asset list"),
        UpdateError::DownloadFailed {
            ..
        } => ctx
            .with_suggestion("Try again later")
            .with_details("Nothing was installed; the existing installation is unchanged"),
        UpdateError::InstallDirUnavailable {
            ..
        } => ctx
            .with_suggestion("Reinstall manually from the releases page")
            .with_details("The update was downloaded but the installation directory could not be resolved"),
        UpdateError::ExtractFailed {
            ..
        } => ctx
            .with_suggestion("Reinstall manually from the releases page")
            .with_details(
                "The update was downloaded but extraction failed; some files may already have been replaced",
            ),
        UpdateError::ConfigError {
            ..
        } => ctx.with_suggestion("Check your config file or pass --config with a valid path"),
        UpdateError::Other {
            ..
        } => ctx.with_suggestion("Check the error message above for more details"),
    }
}
