//! Core types for selfup
//!
//! Holds the error taxonomy shared by every pipeline stage and the helpers
//! that turn those errors into terminal output.
//!
//! # Modules
//!
//! - `error` - [`UpdateError`] and the [`ErrorContext`] display wrapper
//! - `error_formatting` - [`user_friendly_error`] and per-variant suggestions
//!
//! # Error Handling Pattern
//!
//! Library code returns `Result<T, UpdateError>` so callers can match on the
//! failing stage. The CLI wraps those in `anyhow` with extra context and
//! converts back at the very end:
//!
//! ```rust
//! use selfup::core::{UpdateError, user_friendly_error};
//!
//! let err = anyhow::Error::from(UpdateError::FeedRejected {
//!     feed: "acme/tool".to_string(),
//!     status: 404,
//! });
//! let ctx = user_friendly_error(err);
//! assert!(ctx.suggestion.is_some());
//! ```

pub mod error;
pub mod error_formatting;

pub use error::{ErrorContext, UpdateError};
pub use error_formatting::{create_error_context, user_friendly_error};
