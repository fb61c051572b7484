//! Integration test suite for selfup
//!
//! End-to-end tests that drive the update pipeline over real HTTP (a local
//! `mockito` server) and the `selfup` binary itself.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **upgrade**: pipeline through `ReqwestTransport` against a mock feed,
//!   including real `tar` extraction on Unix
//! - **cli**: `selfup upgrade` and `selfup platform` via `assert_cmd`

mod cli;
mod upgrade;
