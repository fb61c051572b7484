//! Configuration management for selfup
//!
//! Only the CLI host reads configuration. It loads a small TOML file, lets
//! command-line flags override it, and passes the result explicitly to the
//! update pipeline, which has no ambient configuration of its own.
//!
//! # Modules
//!
//! - `global` - the global settings file and its location rules
//!
//! # Location
//!
//! In order of precedence:
//!
//! 1. `--config <path>` (`~` is expanded)
//! 2. `SELFUP_CONFIG` environment variable
//! 3. `~/.selfup/config.toml` (`%LOCALAPPDATA%\selfup\config.toml` on Windows)
//!
//! A missing file is not an error; defaults apply.

pub mod global;

pub use global::{GlobalConfig, UpdateSettings};
