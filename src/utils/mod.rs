//! Cross-platform utilities for selfup
//!
//! # Modules
//!
//! - `platform` - platform identity, the self-update capability gate, and
//!   locating the running executable
//! - `progress` - `indicatif` spinners that honor `--no-progress`

pub mod platform;
pub mod progress;

pub use platform::{Platform, can_self_update};
pub use progress::Spinner;
