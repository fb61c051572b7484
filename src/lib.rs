//! selfup - self-updating command-line tool
//!
//! Lets an installed executable find out whether a newer release exists on
//! its GitHub release feed and replace its own installation with it, without
//! a package manager.
//!
//! # Architecture Overview
//!
//! The update pipeline is four stages run in order:
//!
//! ```text
//! capability gate -> release resolver -> asset matcher -> update installer
//! ```
//!
//! - The **gate** refuses platforms that may not rewrite their own install
//!   directory (mobile and sandboxed runtimes).
//! - The **resolver** reads the feed's latest release: a tag and its assets.
//! - The **matcher** picks the asset named `<prefix>-<platform>...`, or
//!   reports that none exists.
//! - The **installer** downloads it to a temporary file and unpacks it with
//!   the platform's archive tool next to the running executable.
//!
//! A `check` stops after matching and has no side effects; an `update` runs
//! every stage. Each call is independent and holds no state afterwards.
//!
//! # Core Modules
//!
//! - [`upgrade`] - the pipeline, its seams, and [`upgrade::SelfUpdater`]
//! - [`core`] - [`core::UpdateError`] and user-facing error rendering
//! - [`utils`] - platform identity and progress spinners
//! - [`config`] - the host's `~/.selfup/config.toml`
//! - [`cli`] - the `selfup` command surface
//! - [`constants`] - network defaults and environment variable names
//!
//! # Example
//!
//! ```rust,no_run
//! use selfup::upgrade::{NativeUnpacker, ReqwestTransport, SelfUpdater, UpdateTarget};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let updater = SelfUpdater::new(ReqwestTransport::new()?, NativeUnpacker::current());
//! let target = UpdateTarget::new("acme/tool".parse()?, "tool");
//!
//! match updater.update(&target).await {
//!     Ok(outcome) if outcome.installed() => println!("updated to {}", outcome.latest_version()),
//!     Ok(_) => println!("already up to date"),
//!     Err(e) if e.partial_outcome().is_some() => eprintln!("partially installed: {e}"),
//!     Err(e) => eprintln!("{} failed: {e}", e.stage()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod upgrade;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
