//! Download-and-unpack step of the update pipeline.
//!
//! This is the only part of the crate with filesystem side effects. It
//! downloads the selected asset into a private temporary file, then unpacks it
//! into the directory holding the running executable.
//!
//! # Guarantees
//!
//! - The temporary file is removed on every exit path, including failures.
//! - Extraction starts only after the body is fully written and the file
//!   handle closed.
//! - The running binary is never overwritten directly: files land in its
//!   directory and replace same-named siblings, nothing more.
//!
//! There is no rollback. If the unpack tool fails halfway the directory may
//! hold a mix of old and new files; the returned [`UpdateError::ExtractFailed`]
//! carries an outcome with `downloaded = true, installed = false` so the
//! caller can say so.

use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::outcome::UpdateOutcome;
use super::release::{ReleaseAsset, ReleaseSnapshot};
use super::transport::{ACCEPT_BINARY, HttpTransport};
use super::unpack::{ArchiveUnpacker, archive_suffix};
use crate::core::UpdateError;
use crate::utils::platform::current_exe_dir;

/// Installs one release asset.
#[derive(Debug, Clone)]
pub struct UpdateInstaller<T, U> {
    transport: T,
    unpacker: U,
    install_dir: Option<PathBuf>,
}

impl<T: HttpTransport, U: ArchiveUnpacker> UpdateInstaller<T, U> {
    /// Installer that targets the running executable's directory.
    pub const fn new(transport: T, unpacker: U) -> Self {
        Self {
            transport,
            unpacker,
            install_dir: None,
        }
    }

    /// Unpack into `dir` instead of the executable's directory.
    #[must_use]
    pub fn with_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = Some(dir.into());
        self
    }

    /// Download `asset` from `snapshot` and unpack it.
    ///
    /// # Errors
    ///
    /// - [`UpdateError::DownloadFailed`] if the asset could not be fetched or
    ///   written to disk. Nothing was installed.
    /// - [`UpdateError::InstallDirUnavailable`] if the target directory could
    ///   not be resolved.
    /// - [`UpdateError::ExtractFailed`] if the unpack tool failed. The
    ///   directory may be partially updated.
    pub async fn install(
        &self,
        snapshot: &ReleaseSnapshot,
        asset: &ReleaseAsset,
    ) -> Result<UpdateOutcome, UpdateError> {
        let outcome = UpdateOutcome::available(&snapshot.tag, &asset.name);

        let archive = self.download(asset).await?;
        let outcome = outcome.mark_downloaded();

        let install_dir = self.resolve_install_dir().map_err(|e| {
            UpdateError::InstallDirUnavailable {
                reason: e.to_string(),
                outcome: Box::new(outcome.clone()),
            }
        })?;

        info!("Unpacking {} into {}", asset.name, install_dir.display());
        if let Err(e) = self.unpacker.unpack(&archive, &install_dir).await {
            warn!(
                "Extraction of {} failed; {} may be partially updated",
                asset.name,
                install_dir.display()
            );
            return Err(UpdateError::ExtractFailed {
                tool: e.tool,
                reason: e.reason,
                outcome: Box::new(outcome),
            });
        }
        // `archive` drops here and removes the temporary file.

        info!("Installed {} from {}", asset.name, snapshot.tag);
        Ok(outcome.mark_installed())
    }

    /// Fetch the asset into a closed temporary file.
    ///
    /// The returned path deletes the file when dropped.
    async fn download(&self, asset: &ReleaseAsset) -> Result<tempfile::TempPath, UpdateError> {
        let failed = |reason: String| UpdateError::DownloadFailed {
            asset: asset.name.clone(),
            reason,
        };

        debug!("Downloading {} from {}", asset.name, asset.download_url);
        let response = self
            .transport
            .get(&asset.download_url, ACCEPT_BINARY)
            .await
            .map_err(|e| failed(e.to_string()))?;

        if !response.is_success() {
            return Err(failed(format!("HTTP {}", response.status)));
        }

        let len = response.body.len();
        let suffix = archive_suffix(&asset.name);
        let path = tokio::task::spawn_blocking(move || write_temp_archive(&response.body, &suffix))
            .await
            .map_err(|e| failed(format!("write task failed: {e}")))?
            .map_err(|e| failed(format!("cannot write temporary file: {e}")))?;

        debug!("Downloaded {} bytes to {}", len, path.display());
        Ok(path)
    }

    fn resolve_install_dir(&self) -> std::io::Result<PathBuf> {
        match &self.install_dir {
            Some(dir) if dir.is_dir() => Ok(dir.clone()),
            Some(dir) => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", dir.display()),
            )),
            None => current_exe_dir(),
        }
    }
}

/// Write `body` to a new `selfup-*<suffix>` temporary file and close it.
fn write_temp_archive(body: &[u8], suffix: &str) -> std::io::Result<tempfile::TempPath> {
    let mut file = tempfile::Builder::new().prefix("selfup-").suffix(suffix).tempfile()?;
    file.write_all(body)?;
    file.flush()?;
    Ok(file.into_temp_path())
}
