//! Self-update pipeline.
//!
//! Lets an installed `selfup` binary find out whether a newer release exists
//! on its GitHub release feed, pick the archive built for the current
//! platform, and unpack it over its own installation directory.
//!
//! # Architecture Overview
//!
//! Four stages run in a fixed order:
//!
//! - **Capability gate** ([`Platform::can_self_update`](crate::utils::platform::Platform::can_self_update)):
//!   refuses platforms that cannot rewrite their own install directory
//! - **Release resolver** ([`ReleaseResolver`]): one request to the feed's
//!   "latest release" endpoint, decoded into a [`ReleaseSnapshot`]
//! - **Asset matcher** ([`select_asset`]): first asset named
//!   `<prefix>-<platform label>`
//! - **Update installer** ([`UpdateInstaller`]): temporary download, then the
//!   platform's archive tool unpacks it next to the executable
//!
//! [`SelfUpdater`] composes them:
//!
//! ```text
//! check   gate ─> resolve ─> match                    (no side effects)
//! update  gate ─> resolve ─> match ─> download ─> unpack
//! ```
//!
//! # Failure Semantics
//!
//! Every stage failure comes back as an [`UpdateError`](crate::core::UpdateError)
//! naming the stage. Nothing retries, nothing is swallowed. "No asset for this
//! platform" is not an error: the outcome reports `update_available = false`.
//!
//! The outcome flags form a chain (`installed` implies `downloaded` implies
//! `update_available`). When extraction fails after a complete download the
//! error carries an outcome with `downloaded = true, installed = false`; files
//! already written are not rolled back.
//!
//! # Seams
//!
//! Network access goes through [`HttpTransport`] and archive extraction through
//! [`ArchiveUnpacker`], so the whole pipeline runs in tests against scripted
//! responses without touching the network or spawning tools.
//!
//! # Usage
//!
//! ```bash
//! selfup upgrade --check        # report whether an update exists
//! selfup upgrade                # install it
//! selfup upgrade --force        # reinstall the latest release
//! ```

pub mod asset;
pub mod installer;
pub mod outcome;
pub mod release;
pub mod self_updater;
pub mod transport;
pub mod unpack;


pub use asset::{expected_asset_prefix, select_asset};
pub use installer::UpdateInstaller;
pub use outcome::UpdateOutcome;
pub use release::{ReleaseAsset, ReleaseFeed, ReleaseResolver, ReleaseSnapshot, UpdateTarget};
pub use self_updater::{SelfUpdater, same_version};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};
pub use unpack::{ArchiveUnpacker, NativeUnpacker, UnpackError};
