//! Test utilities for selfup
//!
//! Fakes for the two seams of the update pipeline plus a logging helper.
//! Available to this crate's own tests and, through the `test-utils`
//! feature, to the integration suite.
//!
//! - [`FakeTransport`] answers requests from a script and logs every call
//! - [`RecordingUnpacker`] records unpack calls and can fail on demand
//! - [`release_json`] builds a "latest release" document
//!
//! # Example
//!
//! ```rust,no_run
//! use selfup::test_utils::{FakeTransport, RecordingUnpacker, release_json};
//! use selfup::upgrade::{SelfUpdater, UpdateTarget};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let transport = FakeTransport::new()
//!     .respond(200, release_json("v2.0.0", &["tool-linux.tar.gz"]))
//!     .respond(200, b"archive".to_vec());
//! let unpacker = RecordingUnpacker::new();
//! let updater = SelfUpdater::new(&transport, &unpacker);
//! let outcome = updater.update(&UpdateTarget::new("acme/tool".parse()?, "tool")).await?;
//! # Ok(())
//! # }
//! ```

use futures::future::BoxFuture;
use serde_json::json;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::upgrade::transport::{HttpResponse, HttpTransport, TransportError};
use crate::upgrade::unpack::{ArchiveUnpacker, UnpackError};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=selfup=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// "Latest release" JSON with one asset per name.
///
/// Download URLs point at `https://example.invalid/download/<tag>/<name>`.
pub fn release_json(tag: &str, asset_names: &[&str]) -> String {
    release_json_with_base(tag, asset_names, "https://example.invalid")
}

/// Like [`release_json`], with download URLs under `base`.
///
/// Used with a mock server so the installer downloads from it too.
pub fn release_json_with_base(tag: &str, asset_names: &[&str], base: &str) -> String {
    let assets: Vec<_> = asset_names
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "size": 0,
                "browser_download_url": format!("{base}/download/{tag}/{name}"),
            })
        })
        .collect();
    json!({
        "tag_name": tag,
        "name": format!("Release {tag}"),
        "draft": false,
        "prerelease": false,
        "assets": assets,
    })
    .to_string()
}

/// One request seen by [`FakeTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Requested URL
    pub url: String,
    /// `Accept` header
    pub accept: String,
}

/// [`HttpTransport`] that replays scripted responses in order.
///
/// Requests beyond the script fail with a transport error, which makes an
/// unexpected extra request visible in the test.
#[derive(Debug, Default)]
pub struct FakeTransport {
    script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    calls: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
    /// Transport with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    #[must_use]
    pub fn respond(self, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.push(Ok(HttpResponse::new(status, body)))
    }

    /// Queue a connection-level failure.
    #[must_use]
    pub fn fail(self, reason: &str) -> Self {
        self.push(Err(TransportError(reason.to_string())))
    }

    fn push(self, entry: Result<HttpResponse, TransportError>) -> Self {
        self.script.lock().unwrap().push_back(entry);
        self
    }

    /// Requests made so far.
    pub fn calls(&self) -> Vec<RecordedRequest> {
        self.calls.lock().unwrap().clone()
    }
}

impl HttpTransport for FakeTransport {
    fn get<'a>(
        &'a self,
        url: &'a str,
        accept: &'a str,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportError>> {
        self.calls.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            accept: accept.to_string(),
        });
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError(format!("unscripted request to {url}"))));
        Box::pin(async move { next })
    }
}

/// One call seen by [`RecordingUnpacker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackCall {
    /// Archive path passed in
    pub archive: PathBuf,
    /// Destination directory passed in
    pub dest: PathBuf,
    /// Whether the archive existed when unpack was called
    pub archive_existed: bool,
    /// Archive bytes at call time (empty if it did not exist)
    pub contents: Vec<u8>,
}

/// [`ArchiveUnpacker`] that records calls instead of running a tool.
///
/// Optionally writes files into the destination (to look like a real
/// extraction) and then fails (to look like a tool that died halfway).
#[derive(Debug, Default)]
pub struct RecordingUnpacker {
    files: Vec<(String, Vec<u8>)>,
    failure: Option<UnpackError>,
    calls: Mutex<Vec<UnpackCall>>,
}

impl RecordingUnpacker {
    /// Unpacker that succeeds without writing anything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `name` with `contents` into the destination on every call.
    #[must_use]
    pub fn with_file(mut self, name: &str, contents: &[u8]) -> Self {
        self.files.push((name.to_string(), contents.to_vec()));
        self
    }

    /// Fail every call with `reason`, after writing any configured files.
    #[must_use]
    pub fn failing(mut self, tool: &str, reason: &str) -> Self {
        self.failure = Some(UnpackError::new(tool, reason));
        self
    }

    /// Calls made so far.
    pub fn calls(&self) -> Vec<UnpackCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl ArchiveUnpacker for RecordingUnpacker {
    fn unpack<'a>(
        &'a self,
        archive: &'a Path,
        dest: &'a Path,
    ) -> BoxFuture<'a, Result<(), UnpackError>> {
        Box::pin(async move {
            let contents = std::fs::read(archive).ok();
            self.calls.lock().unwrap().push(UnpackCall {
                archive: archive.to_path_buf(),
                dest: dest.to_path_buf(),
                archive_existed: contents.is_some(),
                contents: contents.unwrap_or_default(),
            });

            for (name, data) in &self.files {
                std::fs::write(dest.join(name), data)
                    .map_err(|e| UnpackError::new("recorder", e.to_string()))?;
            }

            match &self.failure {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        })
    }
}
